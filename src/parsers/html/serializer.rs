use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::i18n::error::{I18nError, I18nResult};

/// 序列化文档
///
/// 指令注释节点原样保留，输出可以再次作为输入重新翻译。
pub fn serialize_document(document: Handle, document_encoding: &str) -> I18nResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default()).map_err(|e| {
        I18nError::SerializationError(format!("Unable to serialize DOM into buffer: {}", e))
    })?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}
