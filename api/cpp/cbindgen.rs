// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use anyhow::Context;
use std::path::{Path, PathBuf};

const HEADER_NAME: &str = "engine_context.h";

fn ensure_cargo_rerun_for_crate(
    crate_dir: &Path,
    dependencies: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    dependencies.push(crate_dir.to_path_buf());
    for entry in std::fs::read_dir(crate_dir)? {
        let entry = entry?;
        if entry.path().extension().is_some_and(|e| e == "rs") {
            dependencies.push(entry.path());
        }
    }
    Ok(())
}

fn default_config() -> cbindgen::Config {
    cbindgen::Config {
        pragma_once: true,
        include_version: true,
        line_length: 100,
        tab_width: 4,
        // Plain C so that the header can be consumed from C, C++ and Objective-C plugins
        language: cbindgen::Language::C,
        cpp_compat: true,
        documentation: true,
        sys_includes: vec!["stdbool.h".into(), "stddef.h".into(), "stdint.h".into()],
        no_includes: true,
        enumeration: cbindgen::EnumConfig { prefix_with_name: true, ..Default::default() },
        ..Default::default()
    }
}

fn gen_engine_context(
    crate_dir: &Path,
    include_dir: &Path,
    dependencies: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    ensure_cargo_rerun_for_crate(crate_dir, dependencies)?;

    cbindgen::Builder::new()
        .with_config(default_config())
        .with_src(crate_dir.join("lib.rs"))
        .with_src(crate_dir.join("plugin.rs"))
        .with_src(crate_dir.join("dispatch.rs"))
        .generate()
        .context("Unable to generate bindings for engine_context.h")?
        .write_to_file(include_dir.join(HEADER_NAME));

    Ok(())
}

/// Generate the headers.
/// `crate_dir` is the directory of this crate, `include_dir` is the output directory.
/// Returns the list of all paths that contain dependencies to the generated output. If you call this
/// function from build.rs, feed each entry to stdout prefixed with `cargo:rerun-if-changed=`.
pub fn gen_all(crate_dir: &Path, include_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(include_dir).context("Could not create the include directory")?;
    let mut deps = Vec::new();
    gen_engine_context(crate_dir, include_dir, &mut deps)?;
    Ok(deps)
}
