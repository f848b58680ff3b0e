//! CORPCODE.xml parsing.
//!
//! The file has the shape
//!
//! ```text
//! <result>
//!   <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <corp_eng_name>SAMSUNG ELECTRONICS CO,.LTD</corp_eng_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20230110</modify_date>
//!   </list>
//!   ...
//! </result>
//! ```

use dart_core::{CorpInfo, DataError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

#[derive(Clone, Copy, Debug)]
enum Field {
    CorpCode,
    CorpName,
    CorpEngName,
    StockCode,
    ModifyDate,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"corp_code" => Some(Self::CorpCode),
            b"corp_name" => Some(Self::CorpName),
            b"corp_eng_name" => Some(Self::CorpEngName),
            b"stock_code" => Some(Self::StockCode),
            b"modify_date" => Some(Self::ModifyDate),
            _ => None,
        }
    }

    fn assign(self, entry: &mut CorpInfo, text: &str) {
        let slot = match self {
            Self::CorpCode => &mut entry.corp_code,
            Self::CorpName => &mut entry.corp_name,
            Self::CorpEngName => &mut entry.corp_eng_name,
            Self::StockCode => &mut entry.stock_code,
            Self::ModifyDate => &mut entry.modify_date,
        };
        slot.push_str(text);
    }
}

/// Parses the corporation list published by OpenDART.
///
/// Field values are trimmed, unknown elements are ignored, and entries
/// without a corp code are dropped. Document order is preserved.
///
/// # Errors
/// Returns [`DataError::Parse`] if the document is not well-formed XML.
pub fn parse_corp_codes(xml: &str) -> Result<Vec<CorpInfo>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<CorpInfo> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"list" => current = Some(CorpInfo::default()),
                tag => field = Field::from_tag(tag),
            },
            Ok(Event::Text(t)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| DataError::Parse(format!("CORPCODE.xml text: {e}")))?;
                    f.assign(entry, text.trim());
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let raw = c.into_inner();
                    f.assign(entry, String::from_utf8_lossy(&raw).trim());
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"list" {
                    if let Some(entry) = current.take().filter(|c| !c.corp_code.is_empty()) {
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DataError::Parse(format!(
                    "CORPCODE.xml parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    debug!(entries = entries.len(), "Parsed CORPCODE.xml");
    Ok(entries)
}
