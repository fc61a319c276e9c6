#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;

use launchpad::cdn::CdnProvider;
use launchpad::error::Error;
use launchpad::http::JsonSource;
use launchpad::pipeline::Services;
use launchpad::storage::{BucketProbe, ObjectStore, PutObject};
use launchpad::utils::command::ProcessRunner;
use launchpad::Result;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct StoreCalls {
    pub heads: Vec<String>,
    pub creates: Vec<(String, Option<String>)>,
    pub puts: Vec<PutObject>,
}

impl StoreCalls {
    pub fn mutations(&self) -> usize {
        self.creates.len() + self.puts.len()
    }
}

/// In-memory object store that records every call.
pub struct FakeStore {
    pub region: String,
    pub bucket_exists: bool,
    /// 1-based index of the put that is rejected with HTTP 403.
    pub fail_put_at: Option<usize>,
    pub calls: Rc<RefCell<StoreCalls>>,
}

impl FakeStore {
    pub fn new(region: &str, bucket_exists: bool) -> (Self, Rc<RefCell<StoreCalls>>) {
        let calls = Rc::new(RefCell::new(StoreCalls::default()));
        (
            Self {
                region: region.to_string(),
                bucket_exists,
                fail_put_at: None,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl ObjectStore for FakeStore {
    fn region(&self) -> &str {
        &self.region
    }

    fn head_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        self.calls.borrow_mut().heads.push(bucket.to_string());
        Ok(if self.bucket_exists {
            BucketProbe::Exists
        } else {
            BucketProbe::Missing
        })
    }

    fn create_bucket(&self, bucket: &str, location: Option<&str>) -> Result<()> {
        self.calls
            .borrow_mut()
            .creates
            .push((bucket.to_string(), location.map(str::to_string)));
        Ok(())
    }

    fn put_object(&self, object: &PutObject) -> Result<()> {
        let mut calls = self.calls.borrow_mut();
        calls.puts.push(object.clone());
        if self.fail_put_at == Some(calls.puts.len()) {
            return Err(Error::storage_request_failed("put_object", Some(403), "AccessDenied"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationCall {
    pub distribution_id: String,
    pub paths: Vec<String>,
    pub caller_reference: String,
}

pub struct FakeCdn {
    pub calls: Rc<RefCell<Vec<InvalidationCall>>>,
}

impl FakeCdn {
    pub fn new() -> (Self, Rc<RefCell<Vec<InvalidationCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl CdnProvider for FakeCdn {
    fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[&str],
        caller_reference: &str,
    ) -> Result<String> {
        self.calls.borrow_mut().push(InvalidationCall {
            distribution_id: distribution_id.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            caller_reference: caller_reference.to_string(),
        });
        Ok("I2J0I21PCUYOIK".to_string())
    }
}

/// Serves canned payloads by URL; unknown URLs fail like an unreachable host.
pub struct FakeJson {
    pub responses: HashMap<String, Value>,
}

impl FakeJson {
    pub fn new(responses: &[(&str, Value)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(url, value)| (url.to_string(), value.clone()))
                .collect(),
        }
    }
}

impl JsonSource for FakeJson {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::remote_request_failed(url, "connection refused"))
    }
}

/// Records invocations and optionally creates the export directory when the
/// build script runs.
pub struct FakeRunner {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub build_creates_output: bool,
    pub failing: Option<(String, i32)>,
}

impl FakeRunner {
    pub fn new(build_creates_output: bool) -> (Self, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
                build_creates_output,
                failing: None,
            },
            calls,
        )
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> Result<i32> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(line.clone());

        if let Some((command, code)) = &self.failing {
            if *command == line {
                return Ok(*code);
            }
        }
        if line == "npm run build" && self.build_creates_output {
            write_file(&dir.join("out"), "index.html", "<html></html>");
        }
        Ok(0)
    }

    fn probe(&self, program: &str, args: &[&str], _dir: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("probe {} {}", program, args.join(" ")));
        Ok(())
    }
}

pub fn services(
    http: impl JsonSource + 'static,
    runner: impl ProcessRunner + 'static,
    storage: impl ObjectStore + 'static,
    cdn: impl CdnProvider + 'static,
) -> Services {
    Services {
        http: Box::new(http),
        runner: Box::new(runner),
        storage: Box::new(storage),
        cdn: Box::new(cdn),
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// A small static export: one page, one fingerprinted stylesheet, one
/// plain file.
pub fn sample_output(root: &Path) {
    write_file(root, "index.html", "<html></html>");
    write_file(root, "_next/static/app.css", "body{}");
    write_file(root, "robots.txt", "User-agent: *");
}

/// Minimal HTTP/1.1 server answering each path in `routes` with its JSON
/// body and everything else with 503. Serves `requests` connections, then
/// stops.
pub fn serve_json(routes: Vec<(&'static str, &'static str)>, requests: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let Ok(mut stream) = stream else { continue };
            let mut request_line = String::new();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) if header == "\r\n" || header == "\n" => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }

            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            let (status, body) = routes
                .iter()
                .find(|(route, _)| *route == path)
                .map(|(_, body)| ("200 OK", *body))
                .unwrap_or(("503 Service Unavailable", "{\"error\":\"down\"}"));

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}", addr)
}

/// Base URL of a loopback port with nothing listening on it.
pub fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
