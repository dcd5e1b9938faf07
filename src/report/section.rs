use crate::error::{ApiError, ApiResult};

/// Devuelve el texto entre `start` (excluido) y `end` (excluido).
///
/// Si `start` no aparece se falla con `SectionNotFound`; si `end` no aparece
/// después de `start` se toma el resto del texto.
pub fn extract_section<'a>(text: &'a str, start: &str, end: Option<&str>) -> ApiResult<&'a str> {
    let begin = text
        .find(start)
        .map(|i| i + start.len())
        .ok_or_else(|| ApiError::section_not_found(start, text))?;
    let rest = &text[begin..];
    match end.and_then(|e| rest.find(e)) {
        Some(stop) => Ok(&rest[..stop]),
        None => Ok(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "标题\n== 碳排热点排名 ==\n第1名: A - 1 kg/天\n== 优化建议 ==\n无";

    #[test]
    fn seccion_entre_marcadores() {
        let s = extract_section(TEXT, "碳排热点排名", Some("优化建议")).unwrap();
        assert!(s.contains("第1名"));
        assert!(!s.contains("无"));
    }

    #[test]
    fn sin_marcador_final_toma_el_resto() {
        let s = extract_section(TEXT, "碳排热点排名", Some("不存在")).unwrap();
        assert!(s.ends_with("无"));
        let s = extract_section(TEXT, "优化建议", None).unwrap();
        assert_eq!(s.trim_start_matches([' ', '=', '\n']), "无");
    }

    #[test]
    fn sin_marcador_inicial_incluye_prefijo() {
        let err = extract_section(TEXT, "策略推荐", None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("策略推荐"));
        assert!(msg.contains("标题"));
    }
}
