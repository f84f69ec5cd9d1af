fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("GOMA_H")
        .generate();

    match result {
        Ok(bindings) => {
            let _ = std::fs::create_dir_all(format!("{crate_dir}/include"));
            bindings.write_to_file(format!("{crate_dir}/include/goma.h"));
        }
        Err(err) => println!("cargo:warning=skipping C header generation: {err}"),
    }
}
