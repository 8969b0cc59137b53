//! Save/open round trips and error propagation through storage.

use imago_io::{
    clone_image, decode, encode, open, save, EncodeOptions, Format, ImageIo, IoError, MemoryStorage,
    NrgbaImage, Storage, StorageWriter,
};
use std::fmt;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

fn image_without_alpha() -> NrgbaImage {
    NrgbaImage::from_raw(
        4,
        6,
        vec![
            0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0xff, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, //
            0xff, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, //
            0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff, 0x88, 0x88, 0x88, 0xff, 0x88, 0x88, 0x88, 0xff, //
            0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff, 0x88, 0x88, 0x88, 0xff, 0x88, 0x88, 0x88, 0xff,
        ],
    )
    .unwrap()
}

fn image_with_alpha() -> NrgbaImage {
    NrgbaImage::from_raw(
        4,
        6,
        vec![
            0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0xff, 0x00, 0x00, 0x80, 0xff, 0x00, 0x00, 0x80, 0x00, 0xff, 0x00, 0x80, 0x00, 0xff, 0x00, 0x80, //
            0xff, 0x00, 0x00, 0x80, 0xff, 0x00, 0x00, 0x80, 0x00, 0xff, 0x00, 0x80, 0x00, 0xff, 0x00, 0x80, //
            0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00, 0x88, 0x88, 0x88, 0x00, 0x88, 0x88, 0x88, 0x00, //
            0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00, 0x88, 0x88, 0x88, 0x00, 0x88, 0x88, 0x88, 0x00,
        ],
    )
    .unwrap()
}

fn assert_close(got: &NrgbaImage, want: &NrgbaImage, delta: u8, what: &str) {
    assert_eq!(got.rect(), want.rect(), "{what}: rect");
    for (i, (g, w)) in got.pix().iter().zip(want.pix()).enumerate() {
        assert!(g.abs_diff(*w) <= delta, "{what}: byte {i} got {g:#04x} want {w:#04x}");
    }
}

#[test]
fn save_open_roundtrip_every_extension() {
    let dir = tempfile::tempdir().unwrap();
    let opts = EncodeOptions::new().with_jpeg_quality(100);

    for ext in ["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff"] {
        let path = dir.path().join(format!("test.{ext}"));
        let img = if ext == "png" { image_with_alpha() } else { image_without_alpha() };

        save(&img, &path, &opts).unwrap_or_else(|e| panic!("save {ext}: {e}"));
        let src = open(&path).unwrap_or_else(|e| panic!("open {ext}: {e}"));
        let got = clone_image(&src);

        let delta = if matches!(ext, "jpg" | "jpeg" | "gif") { 3 } else { 0 };
        assert_close(&got, &img, delta, ext);
    }
}

#[test]
fn save_accepts_source_images() {
    let io = ImageIo::with_storage(MemoryStorage::new());
    let src = imago_io::SourceImage::from(image_without_alpha());
    io.save(&src, "copy.bmp", &EncodeOptions::default()).unwrap();
    let back = clone_image(&io.open("copy.bmp").unwrap());
    assert_eq!(back, image_without_alpha());
}

#[test]
fn extension_match_ignores_case() {
    let io = ImageIo::with_storage(MemoryStorage::new());
    io.save(&image_with_alpha(), "Mixed.PNG", &EncodeOptions::default()).unwrap();
    assert!(io.storage().contains("Mixed.PNG"));
    assert_eq!(clone_image(&io.open("Mixed.PNG").unwrap()), image_with_alpha());
}

#[test]
fn encode_decode_streams() {
    let mut buf = Vec::new();
    encode(&mut buf, &image_with_alpha(), Format::Jpeg, &EncodeOptions::default()).unwrap();
    assert_eq!(Format::from_bytes(&buf), Format::Jpeg);
    let src = decode(Cursor::new(buf)).unwrap();
    assert!(clone_image(&src).is_opaque());

    let err = encode(Vec::new(), &image_with_alpha(), Format::from_index(100), &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat));

    assert!(decode(Cursor::new(b"bad data".to_vec())).is_err());
}

#[test]
fn decode_sniffs_every_format() {
    let img = image_without_alpha();
    for format in Format::ALL {
        let mut buf = Vec::new();
        encode(&mut buf, &img, format, &EncodeOptions::default()).unwrap();
        let src = decode(buf.as_slice()).unwrap_or_else(|e| panic!("{format}: {e}"));
        assert_eq!(src.rect(), img.rect(), "{format}");
    }
}

#[test]
fn empty_image_rejected_by_every_format() {
    let io = ImageIo::with_storage(MemoryStorage::new());
    let empty = NrgbaImage::new(0, 0);
    let opts = EncodeOptions::default();

    for ext in ["jpg", "png", "gif", "bmp", "tif"] {
        let name = format!("empty.{ext}");
        let err = io.save(&empty, &name, &opts).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)), "{ext}: {err}");
        assert_eq!(io.storage().get(&name), Some(Vec::new()), "{ext}");
    }

    for format in Format::ALL {
        let mut buf = Vec::new();
        let err = encode(&mut buf, &empty, format, &opts).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)), "{format}: {err}");
        assert!(buf.is_empty());
    }
}

#[test]
fn unknown_extension_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let err = save(&image_with_alpha(), dir.path().join("test.unknown"), &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat));
    assert!(!dir.path().join("test.unknown").exists());

    assert!(matches!(open(dir.path().join("noext")), Err(IoError::UnsupportedFormat)));
}

#[test]
fn open_missing_file_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = open(dir.path().join("missing.png")).unwrap_err();
    assert_eq!(err.as_io().map(io::Error::kind), Some(io::ErrorKind::NotFound));
}

#[test]
fn open_corrupt_file_reports_decode_error() {
    let storage = MemoryStorage::new();
    storage.insert("broken.png", b"\x89PNG\r\n\x1a\ntruncated".to_vec());
    let io = ImageIo::with_storage(storage);
    assert!(matches!(io.open("broken.png"), Err(IoError::DecodeError(_))));
}

/// Payload of every error the failing storage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Injected {
    Create,
    Close,
    Open,
}

impl fmt::Display for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Injected::Create => "failed to create file",
            Injected::Close => "failed to close file",
            Injected::Open => "failed to open file",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Injected {}

fn injected(err: &IoError) -> Option<Injected> {
    err.as_io()?.get_ref()?.downcast_ref::<Injected>().copied()
}

/// Storage that fails every operation, except that `badFile.jpg` can be
/// created and written but not closed.
struct FailingStorage;

impl Storage for FailingStorage {
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>> {
        if name == Path::new("badFile.jpg") {
            return Ok(Box::new(FailOnClose(io::sink())));
        }
        Err(io::Error::other(Injected::Create))
    }

    fn open(&self, _name: &Path) -> io::Result<Box<dyn Read>> {
        Err(io::Error::other(Injected::Open))
    }
}

struct FailOnClose(io::Sink);

impl Write for FailOnClose {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl StorageWriter for FailOnClose {
    fn close(self: Box<Self>) -> io::Result<()> {
        Err(io::Error::other(Injected::Close))
    }
}

#[test]
fn storage_errors_surface_unchanged() {
    let io = ImageIo::with_storage(FailingStorage);
    let img = image_with_alpha();
    let opts = EncodeOptions::default();

    let err = io.save(&img, "test.jpg", &opts).unwrap_err();
    assert_eq!(injected(&err), Some(Injected::Create));
    assert_eq!(err.to_string(), "failed to create file");

    let err = io.save(&img, "badFile.jpg", &opts).unwrap_err();
    assert_eq!(injected(&err), Some(Injected::Close));

    let err = io.open("test.jpg").unwrap_err();
    assert_eq!(injected(&err), Some(Injected::Open));
}

#[test]
fn unsupported_format_checked_before_storage() {
    let io = ImageIo::with_storage(FailingStorage);
    let img = image_with_alpha();
    assert!(matches!(
        io.save(&img, "test.unknown", &EncodeOptions::default()),
        Err(IoError::UnsupportedFormat)
    ));
    assert!(matches!(io.open("test.xyz"), Err(IoError::UnsupportedFormat)));
}

#[test]
fn encode_error_wins_over_close_error() {
    // too wide for JPEG, and the writer refuses to close
    let io = ImageIo::with_storage(FailingStorage);
    let img = NrgbaImage::new(70_000, 1);
    let err = io.save(&img, "badFile.jpg", &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::EncodeError(_)));
}

#[test]
fn storage_swap_is_scoped_to_instance() {
    let failing = ImageIo::with_storage(FailingStorage);
    assert!(failing.open("test.png").is_err());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fine.png");
    save(&image_with_alpha(), &path, &EncodeOptions::default()).unwrap();
    assert!(open(&path).is_ok());
}
