use bcc_lib as bcc;

fn main() {
    let options = bcc::options::get();
    bcc::logger::init(options.verbose).expect("Logger initialization failed");

    if let Err(code) = bcc::driver::drive(options) {
        std::process::exit(code);
    }
}
