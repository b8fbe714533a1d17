//! Status code decoding.
//!
//! SPB operations carry two numeric statuses: the primary `statusop` (where
//! the operation is in its lifecycle) and an optional secondary `statusmsg`
//! (what the last message said about it). Both share one code space.

/// Known status codes and their operational labels, sorted by code.
pub const KNOWN_STATUSES: &[(i32, &str)] = &[
    (100, "ENVIO_PILOTO"),
    (106, "ENVIO_SUCESSO"),
    (204, "RECEBTO_SUCESSO"),
    (205, "ERRO_BACEN"),
    (301, "PROCESSANDO"),
    (302, "OK"),
    (306, "INFORMATIVO"),
    (307, "AVISO"),
    (313, "AGUARD_LIB_AUTORIZ"),
    (320, "REJ_AUTORIZADOR"),
    (324, "PIX_AUTO_NAO_CONTRATADO"),
];

/// Label for a known code, if any.
pub fn label(code: i32) -> Option<&'static str> {
    KNOWN_STATUSES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| KNOWN_STATUSES[idx].1)
}

/// Decode a status code. Unknown codes render as their decimal value.
pub fn decode(code: i32) -> String {
    label(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Whether a secondary status is meaningful.
pub fn has_secondary(status_msg: Option<i32>) -> bool {
    matches!(status_msg, Some(code) if code > 0)
}

/// Human description of a record's status pair.
///
/// `"OK"` when there is no secondary status, `"AGUARD_LIB_AUTORIZ (REJ_AUTORIZADOR)"`
/// when there is one.
pub fn describe(status_op: i32, status_msg: Option<i32>) -> String {
    let primary = decode(status_op);
    match status_msg {
        Some(code) if has_secondary(status_msg) => format!("{} ({})", primary, decode(code)),
        _ => primary,
    }
}
