fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    #[cfg(feature = "cbindgen")]
    {
        let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
        let config = cbindgen::Config::from_file("cbindgen.toml")
            .expect("unable to read cbindgen.toml configuration file");

        if let Ok(bindings) = cbindgen::generate_with_config(&crate_dir, config) {
            bindings.write_to_file("pbuf_http.h");
        }
    }

    cdylib_link_lines::metabuild();
}
