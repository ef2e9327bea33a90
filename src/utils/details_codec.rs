//! 详情令牌编解码
//!
//! 令牌格式：JSON 三元组数组 → zlib 压缩 → URL 安全 base64（无填充）。
//! 令牌直接放在详情页链接中，服务端无需保存任何会话状态。

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

use crate::errors::{FluffyError, Result};
use crate::models::FileDetail;

/// 解压后的令牌内容上限，防止压缩炸弹
const MAX_DECODED_SIZE: u64 = 1024 * 1024;

/// 将文件详情列表编码为令牌
pub fn encode_details(details: &[FileDetail]) -> Result<String> {
    let json = serde_json::to_vec(details)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// 将令牌解码为文件详情列表，顺序与编码时一致
pub fn decode_details(token: &str) -> Result<Vec<FileDetail>> {
    let compressed = URL_SAFE_NO_PAD.decode(token.trim())?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_SIZE + 1)
        .read_to_end(&mut json)
        .map_err(|e| FluffyError::token_decode(format!("Corrupt token payload: {e}")))?;

    if json.len() as u64 > MAX_DECODED_SIZE {
        return Err(FluffyError::token_decode("Token payload is too large"));
    }

    serde_json::from_slice(&json)
        .map_err(|e| FluffyError::token_decode(format!("Malformed token payload: {e}")))
}

/// 空列表对应的令牌，作为详情页的默认值
pub fn empty_token() -> Result<String> {
    encode_details(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(stored: &str, human: &str, size: &str) -> FileDetail {
        FileDetail {
            stored_name: stored.into(),
            human_name: human.into(),
            human_size: size.into(),
        }
    }

    #[test]
    fn test_empty_round_trip() {
        let token = empty_token().unwrap();
        assert!(decode_details(&token).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let details = vec![
            detail("zz.txt", "zeta", "1 bytes"),
            detail("aa.png", "alpha", "2.0 KB"),
            detail("mm", "Makefile", "300 bytes"),
        ];
        let token = encode_details(&details).unwrap();
        assert_eq!(decode_details(&token).unwrap(), details);
    }

    #[test]
    fn test_token_is_url_safe() {
        let details: Vec<_> = (0..50)
            .map(|i| detail(&format!("stored{i}.bin"), &format!("name {i}?&/"), "9 bytes"))
            .collect();
        let token = encode_details(&details).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = decode_details("not base64!!").unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[test]
    fn test_rejects_uncompressed_payload() {
        let token = URL_SAFE_NO_PAD.encode(b"[]");
        assert!(decode_details(&token).is_err());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"[["only-two","fields"]]"#).unwrap();
        let token = URL_SAFE_NO_PAD.encode(encoder.finish().unwrap());

        let err = decode_details(&token).unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&vec![b' '; (MAX_DECODED_SIZE + 10) as usize])
            .unwrap();
        let token = URL_SAFE_NO_PAD.encode(encoder.finish().unwrap());

        assert!(decode_details(&token).is_err());
    }
}
