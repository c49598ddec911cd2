fn main() {
    if let Err(e) = signstream_lib::run() {
        eprintln!("signstream: {:#}", e);
        std::process::exit(1);
    }
}
