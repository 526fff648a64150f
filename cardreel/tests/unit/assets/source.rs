use super::*;

#[test]
fn parses_base64_data_uri() {
    let src = AssetSource::parse("data:audio/mp3;base64,SGVsbG8=").unwrap();
    assert_eq!(
        src,
        AssetSource::Data {
            mime: "audio/mp3",
            base64: true,
            payload: "SGVsbG8=",
        }
    );
    assert_eq!(src.decode_data().unwrap(), b"Hello");
    assert_eq!(src.extension().as_deref(), Some("mp3"));
}

#[test]
fn parses_plain_data_uri_with_percent_escapes() {
    let src = AssetSource::parse("data:,a%20b%zz").unwrap();
    assert_eq!(src.decode_data().unwrap(), b"a b%zz");
    assert_eq!(src.extension(), None);
}

#[test]
fn percent_escapes_need_two_hex_digits() {
    let src = AssetSource::parse("data:,%+1%-f%4").unwrap();
    assert_eq!(src.decode_data().unwrap(), b"%+1%-f%4");
    let src = AssetSource::parse("data:text/plain,%ED%95%9C%EA%B8%80").unwrap();
    assert_eq!(src.decode_data().unwrap(), "한글".as_bytes());
}

#[test]
fn base64_tolerates_whitespace_and_rejects_garbage() {
    let src = AssetSource::parse("data:image/png;base64,SGVs\nbG8=").unwrap();
    assert_eq!(src.decode_data().unwrap(), b"Hello");
    let bad = AssetSource::parse("data:image/png;base64,***").unwrap();
    assert!(bad.decode_data().is_err());
    assert!(AssetSource::parse("data:image/png;base64").is_err());
}

#[test]
fn classifies_remote_and_local() {
    let src = AssetSource::parse("HTTPS://cdn.example.com/a/b.JPG?x=1#frag").unwrap();
    assert!(matches!(src, AssetSource::Remote(_)));
    assert_eq!(src.extension().as_deref(), Some("jpg"));

    let src = AssetSource::parse("https://cdn.example.com/noext").unwrap();
    assert_eq!(src.extension(), None);

    let src = AssetSource::parse("file:///tmp/x.wav").unwrap();
    assert_eq!(src, AssetSource::Local(PathBuf::from("/tmp/x.wav")));
    assert_eq!(src.extension().as_deref(), Some("wav"));
    assert!(src.decode_data().is_err());

    assert!(AssetSource::parse("  ").is_err());
}
