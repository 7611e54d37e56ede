use http::{Response, StatusCode};
use xerror::{Report, StderrLogger, errorf};

fn load_order(id: u64) -> xerror::Result<String> {
    let lookup = std::io::Error::new(std::io::ErrorKind::NotFound, "orders row missing");
    Err(errorf!(lookup, 0x404, "order {} not found", id).with_status(StatusCode::NOT_FOUND))
}

fn handle(id: u64) -> Response<String> {
    let mut response = Response::new(String::new());
    match load_order(id) {
        Ok(body) => *response.body_mut() = body,
        Err(err) => err.handle_http_with(&mut response, &StderrLogger::with_prefix("[orders] ")),
    }
    response
}

fn main() {
    println!("--- HTTP Boundary Example ---\n");

    let response = handle(1234);

    println!("status:  {}", response.status());
    for (name, value) in response.headers() {
        println!("header:  {}: {:?}", name, value);
    }
    print!("body:    {}", response.body());
}
