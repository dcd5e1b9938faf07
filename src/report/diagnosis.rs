//! Página HTML "优化策略" construida a partir de `碳排诊断输出.txt`.

const DEFAULT_LINE: &str = "—";

const ENERGY_REASON: &str = "水泵叶轮磨损或汽蚀，运行工况点偏离高效区";
const ENERGY_STRATEGY: &str = "设备离线检修，优化泵组组合";
const PAC_REASON: &str = "原水水质波动，投加量增大，药剂投加效率低下";
const PAC_STRATEGY: &str = "自适应投加控制，优化混凝水力条件";

/// Línea completa que empieza con `prefix`, conservando unidades: `"标准限值: 0.4 mg/L"`.
pub fn pick_line(text: &str, prefix: &str, default: &str) -> String {
    text.lines()
        .filter_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
        .find(|rest| !rest.is_empty())
        .map(|rest| format!("{} {}", prefix, rest))
        .unwrap_or_else(|| default.to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Valores que la página muestra, separados del marcado para poder probarlos.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisView {
    pub ts_line: String,
    pub o3_limit_line: String,
    pub o3_actual_line: String,
    pub o3_ok: bool,
    pub o3_over_line: String,
    pub energy_hotspot: Option<String>,
    pub pac_hot: bool,
    pub pac_current_line: String,
    pub pac_range_line: String,
}

impl DiagnosisView {
    pub fn from_text(text: &str) -> Self {
        let o3_ok = text.contains("✅ O3投加浓度未超标");
        DiagnosisView {
            ts_line: pick_line(text, "诊断时间:", ""),
            o3_limit_line: pick_line(text, "标准限值:", DEFAULT_LINE),
            o3_actual_line: pick_line(text, "计算O3投加浓度:", DEFAULT_LINE),
            o3_ok,
            o3_over_line: if o3_ok {
                "超标量: 0".to_string()
            } else {
                pick_line(text, "超标量:", "超标量: —")
            },
            energy_hotspot: text.contains("❌ 能耗热点: 取水泵站").then(|| "取水泵站".to_string()),
            pac_hot: text.contains("❌ PAC投加量超标"),
            pac_current_line: pick_line(text, "当前PAC投加量:", "当前PAC投加量: —"),
            pac_range_line: pick_line(text, "正常范围:", "正常范围: —"),
        }
    }
}

fn row(key: &str, value: &str, class: &str) -> String {
    let class = if class.is_empty() { "v".to_string() } else { format!("v {}", class) };
    format!(r#"        <div class="row"><div class="k">{}</div><div class="{}">{}</div></div>"#, key, class, value)
}

const STYLE: &str = r#"
    body {
      margin: 0;
      background: #061426;
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "PingFang SC", "Hiragino Sans GB", "Microsoft YaHei", Arial, sans-serif;
      color: #e9f2ff;
    }
    .wrap { max-width: 980px; margin: 24px auto; padding: 16px; }
    .panel {
      border: 2px solid rgba(120, 190, 255, 0.35);
      border-radius: 16px;
      padding: 18px 18px 8px;
      background: radial-gradient(1200px 600px at 10% 10%, rgba(30,120,255,0.18), rgba(0,0,0,0.35)),
                  linear-gradient(180deg, rgba(14,55,120,0.55), rgba(3,12,24,0.65));
      box-shadow: 0 10px 30px rgba(0,0,0,0.35);
    }
    .header { display:flex; align-items:center; gap:12px; margin-bottom: 14px; }
    .header .title { font-size: 26px; font-weight: 800; color: #ffcc66; letter-spacing: 1px; }
    .header .sub { font-size: 12px; opacity: 0.75; }
    .section { border-top: 1px solid rgba(120,190,255,0.25); padding: 14px 6px 18px; }
    .sec-title { font-size: 22px; font-weight: 800; color: #ffcc66; margin: 0 0 10px 0; }
    .row { display: grid; grid-template-columns: 220px 1fr; gap: 10px 16px; padding: 6px 0; }
    .k { opacity: 0.9; font-size: 16px; letter-spacing: 1px; }
    .v { font-size: 18px; font-weight: 700; white-space: pre-wrap; }
    .ok { color: #8dffb2; }
    .bad { color: #ff7b7b; }
    .hint { opacity: 0.75; font-size: 13px; margin-top: 8px; }
"#;

pub fn render_html(text: &str) -> String {
    let v = DiagnosisView::from_text(text);
    let e = escape_html;

    let o3_state = if v.o3_ok { "未超标" } else { "超标" };
    let scope1 = [
        row("O3设备间O3浓度标准：", &e(&v.o3_limit_line), ""),
        row("O3实际浓度：", &e(&v.o3_actual_line), ""),
        row(
            "超标量：",
            &format!("{}（{}）", e(&v.o3_over_line), o3_state),
            if v.o3_ok { "ok" } else { "bad" },
        ),
        row("优化策略：", "各项指标一切正常", ""),
    ]
    .join("\n");

    let energy_line = format!("能耗热点：{}", v.energy_hotspot.as_deref().unwrap_or("无"));
    let scope2 = [
        row("能耗热点：", &energy_line, if v.energy_hotspot.is_some() { "bad" } else { "ok" }),
        row("可能原因：", ENERGY_REASON, ""),
        row("优化策略：", ENERGY_STRATEGY, ""),
    ]
    .join("\n");

    let scope3 = [
        row("高碳排热点：", if v.pac_hot { "PAC投加" } else { "无" }, if v.pac_hot { "bad" } else { "ok" }),
        row("PAC投加：", &format!("{}\n{}", e(&v.pac_current_line), e(&v.pac_range_line)), ""),
        row("可能原因：", PAC_REASON, ""),
        row("优化策略：", PAC_STRATEGY, ""),
    ]
    .join("\n");

    format!(
        r#"<!doctype html>
<html lang="zh-CN">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>优化策略</title>
  <style>{style}</style>
</head>
<body>
  <div class="wrap">
    <div class="panel">
      <div class="header">
        <div class="title">优化策略</div>
        <div class="sub">{ts}</div>
      </div>
      <div class="section">
        <div class="sec-title">范围1</div>
{scope1}
      </div>
      <div class="section">
        <div class="sec-title">范围2</div>
{scope2}
      </div>
      <div class="section">
        <div class="sec-title">范围3</div>
{scope3}
      </div>
      <div class="hint">说明：本页面数据来自 data/碳排诊断输出.txt，展示内容保留 txt 原单位与原描述。</div>
    </div>
  </div>
</body>
</html>
"#,
        style = STYLE,
        ts = e(&v.ts_line),
        scope1 = scope1,
        scope2 = scope2,
        scope3 = scope3,
    )
}
