//! Tests de integración para el servidor HTTP
//! tests/integration_test.rs
//!
//! Cada test levanta el binario real en un puerto libre, con un document
//! root y un directorio de capturas temporales, y habla con él por TCP.

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Proceso del servidor; se mata al salir del test
struct TestServer {
    child: Child,
    port: u16,
    root: tempfile::TempDir,
    tmp: tempfile::TempDir,
}

impl TestServer {
    fn start() -> Self {
        let root = tempfile::tempdir().expect("root dir");
        let tmp = tempfile::tempdir().expect("tmp dir");

        // Pedir un puerto libre al sistema y liberarlo para el servidor
        let port = TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .map(|addr| addr.port())
            .expect("free port");

        let child = Command::new(env!("CARGO_BIN_EXE_cgi_httpd"))
            .arg("--port")
            .arg(port.to_string())
            .arg("--host")
            .arg("127.0.0.1")
            .arg("--root")
            .arg(root.path())
            .arg("--tmp-dir")
            .arg(tmp.path())
            .arg("--log-level")
            .arg("warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server");

        let server = TestServer { child, port, root, tmp };
        server.wait_ready();
        server
    }

    fn wait_ready(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                return;
            }
            thread::sleep(Duration::from_millis(25));
        }
        panic!("server did not start on port {}", self.port);
    }

    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn write_file(&self, name: &str, content: &[u8], mode: u32) {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Envía bytes crudos y retorna (status, headers, body)
    fn send_raw(&self, raw: &[u8]) -> (u16, String, Vec<u8>) {
        let mut stream = TcpStream::connect(("127.0.0.1", self.port)).expect("connect");
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        stream.write_all(raw).unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).unwrap();
        split_response(&response)
    }

    fn send_request(&self, method: &str, target: &str) -> (u16, String, Vec<u8>) {
        self.send_raw(format!("{} {} HTTP/1.0\r\n\r\n", method, target).as_bytes())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn split_response(response: &[u8]) -> (u16, String, Vec<u8>) {
    let pos = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = String::from_utf8_lossy(&response[..pos]).to_string();
    let body = response[pos + 4..].to_vec();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");
    (status, head, body)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .and_then(|value| value.trim().parse().ok())
        .expect("Content-Length header")
}

fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn test_get_returns_file_contents() {
    let server = TestServer::start();
    let content: Vec<u8> = (0..5000u32).map(|i| (i % 256) as u8).collect();
    server.write_file("data.bin", &content, 0o644);

    let (status, head, body) = server.send_request("GET", "/data.bin");

    assert_eq!(status, 200);
    assert!(head.contains("Content-Type: text/html"));
    assert_eq!(content_length(&head), content.len());
    assert_eq!(body, content);
}

#[test]
fn test_head_returns_length_without_body() {
    let server = TestServer::start();
    server.write_file("index.html", b"<h1>hola</h1>", 0o644);

    let (status, head, body) = server.send_request("HEAD", "/index.html");

    assert_eq!(status, 200);
    assert_eq!(content_length(&head), 13);
    assert!(body.is_empty());
}

#[test]
fn test_only_two_headers() {
    let server = TestServer::start();
    server.write_file("a.txt", b"a", 0o644);

    let (_, head, _) = server.send_request("GET", "/a.txt");
    let headers: Vec<&str> = head.lines().skip(1).collect();

    assert_eq!(headers, ["Content-Type: text/html", "Content-Length: 1"]);
}

#[test]
fn test_traversal_is_forbidden() {
    let server = TestServer::start();
    server.write_file("a.txt", b"a", 0o644);

    for target in ["/../a.txt", "/./../a.txt", "/~/a.txt", "/cgi-like/cat?../a.txt"] {
        for method in ["GET", "HEAD", "POST"] {
            let (status, _, _) = server.send_request(method, target);
            assert_eq!(status, 403, "{} {}", method, target);
        }
    }
}

#[test]
fn test_error_statuses() {
    let server = TestServer::start();
    server.write_file("private.txt", b"secret", 0o600);
    fs::create_dir(server.root.path().join("dir")).unwrap();

    assert_eq!(server.send_request("GET", "/missing.txt").0, 404);
    assert_eq!(server.send_request("GET", "/private.txt").0, 403);
    assert_eq!(server.send_request("GET", "/dir").0, 403);
    assert_eq!(server.send_request("PUT", "/missing.txt").0, 501);
}

#[test]
fn test_error_page_length_matches_body() {
    let server = TestServer::start();

    let (status, head, body) = server.send_request("GET", "/missing.txt");

    assert_eq!(status, 404);
    assert!(head.contains("Content-Type: text/html"));
    assert_eq!(content_length(&head), body.len());
    assert_eq!(body, b"<html><body><h1>404 Not Found</h1></body></html>\r\n");
}

#[test]
fn test_malformed_request_lines() {
    let server = TestServer::start();

    let cases: [&[u8]; 4] = [
        b"\r\n",
        b"GET\r\n",
        b"GET /index.html\r\n",
        b"GET /a b HTTP/1.0\r\n",
    ];

    for raw in cases {
        let (status, _, _) = server.send_raw(raw);
        assert_eq!(status, 400, "{:?}", String::from_utf8_lossy(raw));
    }
}

#[test]
fn test_long_target_is_truncated() {
    let server = TestServer::start();
    let name = "a".repeat(254);
    server.write_file(&name, b"truncated", 0o644);

    // El target se corta a 255 bytes: "/" + 254 letras
    let (status, _, body) = server.send_request("GET", &format!("/{}", "a".repeat(300)));

    assert_eq!(status, 200);
    assert_eq!(body, b"truncated");
}

#[test]
fn test_root_path_is_not_found() {
    let server = TestServer::start();
    assert_eq!(server.send_request("GET", "/").0, 404);
    assert_eq!(server.send_request("HEAD", "/").0, 404);
}

#[test]
fn test_non_utf8_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let server = TestServer::start();
    let path = server.root.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
    fs::write(&path, b"cafe").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let (status, _, body) = server.send_raw(b"GET /caf\xe9.txt HTTP/1.0\r\n\r\n");

    assert_eq!(status, 200);
    assert_eq!(body, b"cafe");
}

#[test]
fn test_cgi_like_echo() {
    let server = TestServer::start();

    let (status, head, body) = server.send_request("GET", "/cgi-like/echo?hello&world");

    assert_eq!(status, 200);
    assert!(head.contains("Content-Type: text/plain"));
    assert_eq!(content_length(&head), body.len());
    assert_eq!(body, b"hello world\n");
    assert!(dir_is_empty(server.tmp.path()));
}

#[test]
fn test_cgi_like_missing_program() {
    let server = TestServer::start();

    let (status, head, body) = server.send_request("GET", "/cgi-like/no-such-program-4711");

    assert_eq!(status, 200);
    assert_eq!(content_length(&head), 0);
    assert!(body.is_empty());
    assert!(dir_is_empty(server.tmp.path()));
}

#[test]
fn test_concurrent_cgi_requests() {
    let server = TestServer::start();
    let port = server.port;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            thread::spawn(move || {
                let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
                let request = format!("GET /cgi-like/echo?client-{} HTTP/1.0\r\n\r\n", i);
                stream.write_all(request.as_bytes()).unwrap();
                let mut response = Vec::new();
                stream.read_to_end(&mut response).unwrap();
                (i, split_response(&response))
            })
        })
        .collect();

    for handle in handles {
        let (i, (status, _, body)) = handle.join().unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, format!("client-{}\n", i).into_bytes());
    }
    assert!(dir_is_empty(server.tmp.path()));
}

#[test]
fn test_slow_client_does_not_block_others() {
    let server = TestServer::start();
    server.write_file("a.txt", b"a", 0o644);

    // Conexión abierta que nunca envía su request line
    let _idle = TcpStream::connect(("127.0.0.1", server.port)).unwrap();

    let (status, _, body) = server.send_request("GET", "/a.txt");
    assert_eq!(status, 200);
    assert_eq!(body, b"a");
}

/// Cuenta los hijos zombie de `pid` leyendo /proc
#[cfg(target_os = "linux")]
fn zombie_children(pid: u32) -> usize {
    let mut zombies = 0;
    for entry in fs::read_dir("/proc").unwrap().flatten() {
        let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
            continue;
        };
        // Formato: "pid (comm) state ppid ..."; comm puede tener espacios
        let Some(after_comm) = stat.rfind(')').map(|i| &stat[i + 1..]) else {
            continue;
        };
        let fields: Vec<&str> = after_comm.split_whitespace().collect();
        if fields.len() > 1 && fields[0] == "Z" && fields[1] == pid.to_string() {
            zombies += 1;
        }
    }
    zombies
}

#[cfg(target_os = "linux")]
#[test]
fn test_workers_are_reaped() {
    let server = TestServer::start();
    server.write_file("a.txt", b"a", 0o644);

    for _ in 0..25 {
        assert_eq!(server.send_request("GET", "/a.txt").0, 200);
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let zombies = zombie_children(server.pid());
        if zombies == 0 {
            break;
        }
        assert!(Instant::now() < deadline, "{} unreaped workers", zombies);
        thread::sleep(Duration::from_millis(50));
    }
}
