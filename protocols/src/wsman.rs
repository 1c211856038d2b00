//! WS-Management `Identify` exchange.
//!
//! `Identify` is the one WS-Man operation a WinRM listener answers without
//! credentials, which makes it the cheapest proof that the service (not just
//! its port) is alive.

use std::net::Ipv6Addr;

use anyhow::bail;
use reachr_common::checks::WinRmTransport;
use tracing::trace;

pub const WSMAN_PATH: &str = "/wsman";
pub const CONTENT_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Header WinRM requires before it answers an anonymous `Identify`.
pub const IDENTIFY_HEADER: (&str, &str) = ("WSMANIDENTIFY", "unauthenticated");

pub const IDENTIFY_ENVELOPE: &str = concat!(
    r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" "#,
    r#"xmlns:wsmid="http://schemas.dmtf.org/wbem/wsman/identity/1/wsmanidentity.xsd">"#,
    "<s:Header/>",
    "<s:Body><wsmid:Identify/></s:Body>",
    "</s:Envelope>"
);

/// What a listener reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifyResponse {
    pub protocol_version: Option<String>,
    pub product_vendor: Option<String>,
    pub product_version: Option<String>,
}

/// Builds the listener URL, bracketing IPv6 literals.
pub fn endpoint_url(host: &str, port: u16, transport: WinRmTransport) -> String {
    let host: String = match host.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{host}]"),
        Err(_) => host.to_string(),
    };
    format!("{}://{host}:{port}{WSMAN_PATH}", transport.scheme())
}

pub fn parse_identify_response(body: &str) -> anyhow::Result<IdentifyResponse> {
    if find_element(body, "IdentifyResponse").is_none() {
        if find_element(body, "Fault").is_some() {
            let reason = element_text(body, "Text").unwrap_or("no reason given");
            bail!("WS-Management fault: {reason}");
        }
        bail!("response is not a WS-Management IdentifyResponse");
    }

    let response = IdentifyResponse {
        protocol_version: element_text(body, "ProtocolVersion").map(str::to_string),
        product_vendor: element_text(body, "ProductVendor").map(str::to_string),
        product_version: element_text(body, "ProductVersion").map(str::to_string),
    };
    trace!("{response:?}");
    Ok(response)
}

/// Finds the first opening tag whose local name (prefix stripped) is `local`.
///
/// Comments and CDATA sections are skipped whole, and a `>` inside a quoted
/// attribute value does not end a tag. Returns the byte offset just past the
/// tag and whether it is self-closing.
fn find_element(xml: &str, local: &str) -> Option<(usize, bool)> {
    let mut cursor: usize = 0;
    while let Some(open) = xml[cursor..].find('<') {
        let tag_start: usize = cursor + open + 1;
        let rest: &str = &xml[tag_start..];

        if let Some(comment) = rest.strip_prefix("!--") {
            cursor = tag_start + 3 + comment.find("-->")? + 3;
            continue;
        }
        if let Some(cdata) = rest.strip_prefix("![CDATA[") {
            cursor = tag_start + 8 + cdata.find("]]>")? + 3;
            continue;
        }

        let close: usize = tag_start + tag_end(rest)?;
        let tag: &str = &xml[tag_start..close];
        cursor = close + 1;

        if tag.starts_with(['/', '?', '!']) {
            continue;
        }

        let self_closing: bool = tag.ends_with('/');
        let name: &str = tag
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let local_name: &str = name.rsplit(':').next().unwrap_or(name);

        if local_name == local {
            return Some((cursor, self_closing));
        }
    }
    None
}

/// Offset of the `>` closing a tag, skipping quoted attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, c) in tag.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(idx),
            None => {}
        }
    }
    None
}

fn element_text<'a>(xml: &'a str, local: &str) -> Option<&'a str> {
    let (content_start, self_closing) = find_element(xml, local)?;
    if self_closing {
        return None;
    }
    let content_end: usize = content_start + xml[content_start..].find('<')?;
    let text: &str = xml[content_start..content_end].trim();
    (!text.is_empty()).then_some(text)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
