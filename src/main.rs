fn main() {
    if let Err(e) = fhirquery_lib::run() {
        eprintln!("fhirquery: {e}");
        std::process::exit(1);
    }
}
