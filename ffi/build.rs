use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let header = crate_dir.join("include").join("signal_ffi.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("SIGNAL_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        // A missing header must not break the Rust build.
        Err(e) => println!("cargo:warning=cbindgen could not generate {}: {e}", header.display()),
    }
}
