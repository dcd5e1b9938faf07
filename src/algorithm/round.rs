use serde_json::{Number, Value};

/// Redondea a 2 decimales todas las hojas flotantes de un `Value`.
///
/// Enteros, textos (incluidos números ya formateados como texto), booleanos
/// y nulos se devuelven sin tocar.
pub fn round2(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => {
            let x = n.as_f64().unwrap_or_default();
            let scaled = (x * 100.0).round();
            // cerca de f64::MAX el escalado desborda; el valor ya no tiene decimales
            let rounded = if scaled.is_finite() { scaled / 100.0 } else { x };
            Number::from_f64(rounded).map(Value::Number).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(round2).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, round2(v))).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redondea_hojas_flotantes() {
        let out = round2(json!({"a": 1.23456, "b": [1.005, "kept as-is"]}));
        assert_eq!(out["a"], json!(1.23));
        let b0 = out["b"][0].as_f64().unwrap();
        assert!(b0 == 1.0 || b0 == 1.01);
        assert_eq!(out["b"][1], json!("kept as-is"));
    }

    #[test]
    fn no_toca_enteros_ni_textos() {
        let v = json!({"code": 0, "s": "12.3456", "n": null, "ok": true, "deep": {"x": [[2.499]]}});
        let out = round2(v);
        assert_eq!(out["code"], json!(0));
        assert_eq!(out["s"], json!("12.3456"));
        assert_eq!(out["n"], Value::Null);
        assert_eq!(out["ok"], json!(true));
        assert_eq!(out["deep"]["x"][0][0], json!(2.5));
    }

    #[test]
    fn magnitudes_extremas_se_conservan() {
        let out = round2(json!({"max": f64::MAX, "min": -1.0e307}));
        assert_eq!(out["max"].as_f64(), Some(f64::MAX));
        assert_eq!(out["min"].as_f64(), Some(-1.0e307));
    }
}
