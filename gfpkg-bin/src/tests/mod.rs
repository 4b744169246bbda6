use {
    crate::ExitCode,
    std::{fs, io::Write, path::Path},
};

const FIRMWARE: &[u8] = &[0xAA, 0xBB];
const FILESYSTEM: &[u8] = &[0x01, 0x02, 0x03];
const PACKAGE: &[u8] = &[
    0x47, 0x46, 0x50, 0x4B, 0x01, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xAA, 0xBB, 0x01, 0x02, 0x03,
];

/// Pack two images given explicitly on the command line.
#[test]
fn pack_explicit_paths() {
    let dir = tempfile::tempdir().unwrap();
    let (firmware, filesystem) = create_images(dir.path());
    let output = dir.path().join("out.gfpkg");
    let output_str = output.to_str().unwrap();

    let result = test(["pack", firmware.as_str(), filesystem.as_str(), output_str]);
    assert_eq!(result.exit_code, ExitCode(0));
    assert_eq!(fs::read(&output).unwrap(), PACKAGE);

    // Prints a summary with the path and sizes.
    assert!(result.stdout.contains(output_str));
    assert!(result.stdout.contains("2 bytes"));
    assert!(result.stdout.contains("3 bytes"));
    assert!(result.stdout.contains("21 bytes"));
    assert!(result.stderr.is_empty());
}

/// Packing empty images produces a header-only package.
#[test]
fn pack_empty_images() {
    let dir = tempfile::tempdir().unwrap();
    let firmware = dir.path().join("firmware.bin");
    let filesystem = dir.path().join("littlefs.bin");
    let output = dir.path().join("system.gfpkg");
    fs::write(&firmware, b"").unwrap();
    fs::write(&filesystem, b"").unwrap();

    let result = test([
        "pack",
        firmware.to_str().unwrap(),
        filesystem.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.exit_code, ExitCode(0));
    assert_eq!(
        fs::read(&output).unwrap(),
        [b'G', b'F', b'P', b'K', 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

/// A missing firmware image is reported by path and no package is written.
#[test]
fn pack_missing_firmware() {
    let dir = tempfile::tempdir().unwrap();
    let (_, filesystem) = create_images(dir.path());
    let missing = dir.path().join("missing.bin");
    let output = dir.path().join("out.gfpkg");

    let result = test([
        "pack",
        missing.to_str().unwrap(),
        filesystem.as_str(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stdout.is_empty());
    assert!(result.stderr.contains("firmware binary not found"));
    assert!(result.stderr.contains(missing.to_str().unwrap()));
    assert!(!output.exists());
}

/// A missing filesystem image points the user at the buildfs target.
#[test]
fn pack_missing_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let (firmware, _) = create_images(dir.path());
    let missing = dir.path().join("missing.bin");
    let output = dir.path().join("out.gfpkg");

    let result = test([
        "pack",
        firmware.as_str(),
        missing.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("filesystem image not found"));
    assert!(result.stderr.contains("pio run -t buildfs"));
    assert!(!output.exists());
}

/// Anything other than zero or three paths prints the usage.
#[test]
fn pack_wrong_path_count() {
    for args in [
        &["pack", "firmware.bin"][..],
        &["pack", "firmware.bin", "littlefs.bin"][..],
        &["pack", "a", "b", "c", "d"][..],
    ] {
        let result = test_slice(args);
        assert_eq!(result.exit_code, ExitCode(1));
        assert!(result.stdout.is_empty());
        assert!(result.stderr.contains(crate::args::PACK_USAGE));
    }
}

/// Without paths, the images come from the build directory in the config.
#[test]
fn pack_default_paths_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let build_dir = dir.path().join("build");
    fs::create_dir(&build_dir).unwrap();
    create_images(&build_dir);
    let config = create_config(dir.path(), r#"build_dir = "build""#);

    let result = test(["pack", "--config", config.as_str()]);
    assert_eq!(result.exit_code, ExitCode(0));
    assert_eq!(fs::read(build_dir.join("system.gfpkg")).unwrap(), PACKAGE);
}

/// Without paths or config, the default environment's build directory is used.
#[test]
fn pack_default_paths() {
    let expected = crate::args::Args::Pack {
        firmware: ".pio/build/wemos_d1_mini32/firmware.bin".into(),
        filesystem: ".pio/build/wemos_d1_mini32/littlefs.bin".into(),
        output: ".pio/build/wemos_d1_mini32/system.gfpkg".into(),
    };
    assert_eq!(crate::args::args(["gfpkg", "pack"]).unwrap(), expected);

    let expected = crate::args::Args::Pack {
        firmware: ".pio/build/d1_mini/firmware.bin".into(),
        filesystem: ".pio/build/d1_mini/littlefs.bin".into(),
        output: ".pio/build/d1_mini/system.gfpkg".into(),
    };
    assert_eq!(
        crate::args::args(["gfpkg", "pack", "--env", "d1_mini"]).unwrap(),
        expected
    );
}

/// The environment name can come from the config file, but not from both.
#[test]
fn pack_env_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path(), r#"env = "d1_mini""#);

    let expected = crate::args::Args::Pack {
        firmware: ".pio/build/d1_mini/firmware.bin".into(),
        filesystem: ".pio/build/d1_mini/littlefs.bin".into(),
        output: ".pio/build/d1_mini/system.gfpkg".into(),
    };
    assert_eq!(
        crate::args::args(["gfpkg", "pack", "-c", config.as_str()]).unwrap(),
        expected
    );

    let result = test(["pack", "-c", config.as_str(), "--env", "d1_mini"]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("env specified in both config and cli"));
}

/// Environment or config options make no sense with explicit paths.
#[test]
fn pack_options_with_explicit_paths() {
    let result = test(["pack", "a", "b", "c", "--env", "d1_mini"]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("--env"));

    let result = test(["pack", "a", "b", "c", "--config", "gfpkg.toml"]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("--config"));
}

/// Unknown config keys and missing config files are errors.
#[test]
fn pack_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path(), r#"target = "esp32""#);
    let result = test(["pack", "-c", config.as_str()]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("gfpkg config file is not valid TOML"));

    let missing = dir.path().join("missing.toml");
    let result = test(["pack", "-c", missing.to_str().unwrap()]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("failed to read gfpkg config file"));
}

/// Dump a valid package.
#[test]
fn dump_valid_package() {
    let file = create_file(PACKAGE);
    let result = test(["dump", "-i", file.path().to_str().unwrap()]);
    assert_eq!(result.exit_code, ExitCode(0));
    assert!(result.stdout.contains("GFPK (4746504b)"));
    assert!(result.stdout.contains("2 B (2)"));
    assert!(result.stdout.contains("3 B (3)"));
    assert!(result.stdout.contains("21 B (21)"));
    assert!(result.stderr.is_empty());
}

/// Dump a file without a package header.
#[test]
fn dump_no_header() {
    let file = create_file(b"Hello, world!");
    let result = test(["dump", "-i", file.path().to_str().unwrap()]);
    assert_eq!(result.exit_code, ExitCode(0));
    assert!(result.stdout.contains("no package header"));
    assert!(result.stderr.is_empty());
}

/// Dump a package whose payload was cut short.
#[test]
fn dump_truncated_package() {
    let file = create_file(&PACKAGE[..PACKAGE.len() - 1]);
    let result = test(["dump", "-i", file.path().to_str().unwrap()]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stdout.is_empty());
    assert!(result.stderr.contains("invalid package size"));
}

/// Dump a package with an unknown format version.
#[test]
fn dump_unsupported_version() {
    let mut data = PACKAGE.to_vec();
    data[4] = 7;
    let file = create_file(&data);
    let result = test(["dump", "-i", file.path().to_str().unwrap()]);
    assert_eq!(result.exit_code, ExitCode(1));
    assert!(result.stderr.contains("unsupported package format version 7"));
}

fn test<const N: usize>(args: [&str; N]) -> Output {
    test_slice(&args)
}

fn test_slice(args: &[&str]) -> Output {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = crate::main_args(
        std::iter::once("gfpkg").chain(args.iter().copied()),
        &mut stdout,
        &mut stderr,
    );
    println!("* args: {:?}", args);
    println!("* exit_code: {:?}", exit_code);
    println!("* stdout:\n{}", String::from_utf8_lossy(&stdout));
    println!("* stderr:\n{}", String::from_utf8_lossy(&stderr));
    Output {
        exit_code,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

#[derive(Debug)]
struct Output {
    exit_code: ExitCode,
    stdout: String,
    stderr: String,
}

fn create_file(data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file
}

/// Write the test images into `dir` and return their paths.
fn create_images(dir: &Path) -> (String, String) {
    let firmware = dir.join("firmware.bin");
    let filesystem = dir.join("littlefs.bin");
    fs::write(&firmware, FIRMWARE).unwrap();
    fs::write(&filesystem, FILESYSTEM).unwrap();
    (
        firmware.to_str().unwrap().to_owned(),
        filesystem.to_str().unwrap().to_owned(),
    )
}

fn create_config(dir: &Path, contents: &str) -> String {
    let path = dir.join("gfpkg.toml");
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_owned()
}
