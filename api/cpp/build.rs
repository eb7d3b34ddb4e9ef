// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use std::path::Path;
mod cbindgen;

fn main() -> Result<(), anyhow::Error> {
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
        .ok_or_else(|| anyhow::anyhow!("CARGO_MANIFEST_DIR is not set"))?;

    let output_dir = match std::env::var_os("ENGINE_CONTEXT_GENERATED_INCLUDE_DIR") {
        Some(dir) => dir,
        None => {
            let out_dir =
                std::env::var_os("OUT_DIR").ok_or_else(|| anyhow::anyhow!("OUT_DIR is not set"))?;
            Path::new(&out_dir).join("generated_include").into()
        }
    };
    let output_dir = Path::new(&output_dir);

    println!("cargo:GENERATED_INCLUDE_DIR={}", output_dir.display());
    println!("cargo:rerun-if-env-changed=ENGINE_CONTEXT_GENERATED_INCLUDE_DIR");

    let dependencies = cbindgen::gen_all(Path::new(&manifest_dir), output_dir)?;
    for path in dependencies {
        println!("cargo:rerun-if-changed={}", path.display());
    }
    Ok(())
}
