use std::env;
use std::path::PathBuf;

// Probing links libav through ffmpeg-sys-next. Compression itself only needs
// an ffmpeg executable at run time, so this script just points Windows users
// at a usable FFmpeg development install.
fn main() {
    for variable in [
        "FFMPEG_DIR",
        "VCPKG_ROOT",
        "VCPKGRS_DYNAMIC",
        "VCPKGRS_TRIPLET",
        "PKG_CONFIG_PATH",
    ] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. Install FFmpeg development libraries (e.g. via vcpkg) and set FFMPEG_DIR so input probing can link."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let install = PathBuf::from(&vcpkg_root).join("installed").join(&triplet);

    if install.join("include").join("libavformat").exists() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {}; set FFMPEG_DIR={} to use it explicitly.",
            install.display(),
            install.display(),
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} has no libavformat headers.",
            install.display(),
        );
    }
}
