use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Name of the configuration-query helper shipped with GraphicsMagick.
const DEFAULT_CONFIG: &str = "GraphicsMagick-config";

fn config_program() -> String {
    env::var("GRAPHICSMAGICK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string())
}

/// Run the config helper with one flag and split its output into tokens.
fn query(program: &str, flag: &str) -> Vec<String> {
    let output = Command::new(program).arg(flag).output().unwrap_or_else(|e| {
        panic!(
            "failed to execute `{} {}`: {}; install GraphicsMagick development files \
             or point GRAPHICSMAGICK_CONFIG at the helper",
            program, flag, e
        )
    });
    if !output.status.success() {
        panic!("`{} {}` exited with {}", program, flag, output.status);
    }
    String::from_utf8(output.stdout)
        .unwrap_or_else(|_| panic!("`{} {}` produced non-UTF8 output", program, flag))
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Keep tokens carrying the given prefix, with the prefix stripped.
fn filter_prefixed(tokens: &[String], prefix: &str) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| t.strip_prefix(prefix))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() {
    println!("cargo:rerun-if-env-changed=GRAPHICSMAGICK_CONFIG");
    println!("cargo:rerun-if-changed=build.rs");

    let program = config_program();
    let libs = filter_prefixed(&query(&program, "--libs"), "-l");
    let lib_dirs = filter_prefixed(&query(&program, "--ldflags"), "-L");
    let include_dirs = filter_prefixed(&query(&program, "--cppflags"), "-I");

    if libs.is_empty() {
        panic!("`{} --libs` reported no `-l` entries", program);
    }

    for dir in &lib_dirs {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    for lib in &libs {
        println!("cargo:rustc-link-lib={}", lib);
    }

    let mut bindings = bindgen::Builder::default()
        .header_contents("wrapper.h", "#include <magick/api.h>\n")
        .allowlist_function(
            "InitializeMagick|DestroyMagick\
             |GetExceptionInfo|DestroyExceptionInfo|SetExceptionInfo\
             |CloneImageInfo|DestroyImageInfo\
             |ReadImage|WriteImage|ConstituteImage|DispatchImage\
             |CloneImage|CloneImageList|DestroyImage|DestroyImageList\
             |NewImageList|AppendImageToList|GetImageListLength|GetImageFromList\
             |MagnifyImage|MinifyImage|ResizeImage|SampleImage|ScaleImage|ThumbnailImage\
             |BlurImage|RotateImage|BorderImage|CharcoalImage|ColorizeImage\
             |CompositeImage|ContrastImage|FlipImage|FlopImage\
             |DrawImage|CloneDrawInfo|DestroyDrawInfo|CloneString\
             |QueryColorDatabase|SetImageOpacity|SetImage",
        )
        .allowlist_type(
            "Image|ImageInfo|ExceptionInfo|PixelPacket|DrawInfo|RectangleInfo\
             |FilterTypes|CompositeOperator|StorageType|ExceptionType|Quantum",
        )
        .allowlist_var("MaxTextExtent|QuantumDepth|OpaqueOpacity|TransparentOpacity")
        // ExceptionType has duplicate discriminants in the C enum, so it is
        // left as an integer alias; the others are clean.
        .rustified_enum("FilterTypes|CompositeOperator|StorageType")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .layout_tests(false);
    for dir in &include_dirs {
        bindings = bindings.clang_arg(format!("-I{}", dir));
    }
    let bindings = bindings.generate().expect("bindgen failed");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    bindings
        .write_to_file(out_dir.join("bindings.rs"))
        .expect("failed to write bindings");
}
