use crate::conformance;
use crate::database::Database;
use crate::errors::Error;
use log::{debug, error, info};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

const MAX_REQUEST: usize = 1 << 20;

#[derive(Debug, PartialEq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
}

fn create_response(value: String, status: &'static str, content_type: &'static str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
        status,
        content_type,
        value.len(),
        value
    )
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Parse a complete HTTP/1.1 request. `None` means more bytes are needed.
pub fn parse_request(buffer: &[u8]) -> Result<Option<Request>, Error> {
    let Some(header_end) = find_header_end(buffer) else {
        return Ok(None);
    };

    let head = std::str::from_utf8(&buffer[..header_end])?;
    let mut lines = head.split("\r\n");

    let mut request_line = lines
        .next()
        .ok_or(Error::Unexpexted("Missing request line"))?
        .split_whitespace();
    let method = request_line
        .next()
        .ok_or(Error::Unexpexted("Missing method"))?
        .to_uppercase();
    let path = request_line
        .next()
        .ok_or(Error::Unexpexted("Missing path"))?
        .to_owned();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.trim().parse::<usize>())
        .transpose()
        .map_err(|_| Error::Unexpexted("Invaild Content-Length"))?
        .unwrap_or(0);

    if content_length > MAX_REQUEST {
        return Err(Error::Unexpexted("Content-Length too large"));
    }

    let body_start = header_end + 4;
    if buffer.len() < body_start + content_length {
        return Ok(None);
    }

    let body = std::str::from_utf8(&buffer[body_start..body_start + content_length])?.to_owned();

    Ok(Some(Request { method, path, body }))
}

fn error_body(err: &Error) -> String {
    json!({ "success": false, "error": err.to_string(), "kind": err.kind() }).to_string()
}

/// Route a request and build the full response text.
pub fn handle_request(request: &Request, db: &Database) -> String {
    debug!("{} {}", request.method, request.path);

    let result = match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/query") => db
            .prepare(&request.body)
            .and_then(|statement| db.query(&statement))
            .and_then(|result| Ok(serde_json::to_string(&result.all())?)),
        ("POST", "/exec") => db
            .exec(&request.body)
            .and_then(|result| Ok(serde_json::to_string(&result)?)),
        ("GET", "/") => serde_json::to_string(&conformance::run_suite(db)).map_err(Error::from),
        _ => {
            return create_response(
                json!({ "error": "Not Found" }).to_string(),
                "404 Not Found",
                "application/json",
            )
        }
    };

    match result {
        Ok(body) => create_response(body, "200 Ok", "application/json"),
        Err(err) => create_response(error_body(&err), "400 Bad Request", "application/json"),
    }
}

fn handle_stream(mut stream: TcpStream, db: Database) -> Result<(), Error> {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0; 1024];

    let request = loop {
        let read = stream.read(&mut chunk)?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);

        match parse_request(&buffer) {
            Ok(Some(request)) => break request,
            Ok(None) => {}
            Err(err) => {
                stream.write_all(
                    create_response(error_body(&err), "400 Bad Request", "application/json")
                        .as_bytes(),
                )?;
                return Ok(());
            }
        }

        if buffer.len() > MAX_REQUEST {
            stream.write_all(
                create_response(String::new(), "413 Payload Too Large", "plain/text").as_bytes(),
            )?;
            return Ok(());
        }
    };

    let res = handle_request(&request, &db);

    stream.write_all(res.as_bytes())?;
    stream.flush()?;

    Ok(())
}

pub fn handle_tcp(address: &str, port: u16, db: Database) -> Result<(), Error> {
    let listener = TcpListener::bind(format!("{}:{}", address, port))?;

    info!("Running on {}:{}", address, port);

    for s in listener.incoming() {
        let stream = match s {
            Ok(stream) => stream,
            Err(err) => {
                error!("Failed to get tcp stream: {}", err);
                continue;
            }
        };

        let db = db.clone();

        std::thread::spawn(move || {
            if let Err(err) = handle_stream(stream, db) {
                error!("{}", err);
            }
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(response: &str) -> serde_json::Value {
        let (_, body) = response.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_parse_request() {
        let raw = b"POST /query HTTP/1.1\r\nHost: x\r\nContent-Length: 8\r\n\r\nselect 1";
        assert_eq!(
            parse_request(raw).unwrap(),
            Some(Request {
                method: "POST".into(),
                path: "/query".into(),
                body: "select 1".into(),
            })
        );

        // body not fully read yet
        let partial = b"POST /query HTTP/1.1\r\nContent-Length: 20\r\n\r\nselect";
        assert_eq!(parse_request(partial).unwrap(), None);
        assert_eq!(parse_request(b"GET / HTTP/1.1\r\n").unwrap(), None);
    }

    #[test]
    fn test_oversized_content_length() {
        let raw = b"POST /query HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\nselect 1";
        assert!(parse_request(raw).is_err());

        let raw = format!(
            "POST /query HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST + 1
        );
        assert!(parse_request(raw.as_bytes()).is_err());
    }

    #[test]
    fn test_query_route() {
        let db = Database::new("test");
        let request = Request {
            method: "POST".into(),
            path: "/query".into(),
            body: "select 1;".into(),
        };

        let response = handle_request(&request, &db);
        assert!(response.starts_with("HTTP/1.1 200 Ok"));

        let body = body_of(&response);
        assert_eq!(body["results"], json!([{ "1": 1 }]));
        assert_eq!(body["meta"]["served_by"], json!("test"));
        assert_eq!(body["success"], json!(true));
    }

    #[test]
    fn test_exec_route_and_errors() {
        let db = Database::default();
        let exec = Request {
            method: "POST".into(),
            path: "/exec".into(),
            body: "select 1; select 1;".into(),
        };
        assert_eq!(body_of(&handle_request(&exec, &db))["count"], json!(2));

        let bad = Request {
            method: "POST".into(),
            path: "/query".into(),
            body: "select * from missing".into(),
        };
        let response = handle_request(&bad, &db);
        assert!(response.starts_with("HTTP/1.1 400"));
        assert_eq!(body_of(&response)["kind"], json!("SchemaError"));
    }

    #[test]
    fn test_conformance_route() {
        let db = Database::default();
        let request = Request {
            method: "GET".into(),
            path: "/".into(),
            body: String::new(),
        };

        let body = body_of(&handle_request(&request, &db));
        assert_eq!(body[0], json!({ "init": "ok" }));
        assert_eq!(body.as_array().map(Vec::len), Some(6));
    }
}
