//! Catálogo de tramos de proceso (预处理, 混凝沉淀, ...) y el cálculo de sus
//! tres widgets: información, tendencia y reparto interno.
//!
//! Cada tramo declara qué unidades suma, cómo empareja sus nombres y qué
//! hacer cuando una selección queda vacía. El código de cálculo es común.

use serde_json::{json, Value};

use crate::algorithm::aggregate::{aggregate, EmptyPolicy, Filter, Matcher, Reduce};
use crate::algorithm::period::Period;
use crate::error::{ApiError, ApiResult};
use crate::excel::{Table, TableSource, INNER_SECTIONS, INNER_UNITS, OUTER_SECTIONS, OUTER_UNITS};

pub const SEGMENT_COL: &str = "工艺段";
pub const UNIT_COL: &str = "工艺单元";

pub const TREND_COLORS: [&str; 9] = [
    "#4992ff", "#7cffb2", "#dd79ff", "#fddd60", "#ff6e76", "#58d9f9", "#05c091", "#ff8a45", "#8d48e3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plant {
    Inner,
    Outer,
}

impl Plant {
    pub fn route(self) -> &'static str {
        match self {
            Plant::Inner => "inner",
            Plant::Outer => "outer",
        }
    }
}

/// Campo del widget de información: suma (o primera fila) de las unidades emparejadas.
#[derive(Debug, Clone, Copy)]
pub struct UnitField {
    pub key: &'static str,
    pub matcher: Matcher<'static>,
    pub reduce: Reduce,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendTarget {
    pub name: &'static str,
    pub matcher: Matcher<'static>,
}

#[derive(Debug, Clone, Copy)]
pub enum TrendSource {
    /// `qtype` elige una unidad (1-based) de la hoja por unidades.
    Units(&'static [TrendTarget]),
    /// Se usa la fila del tramo en la hoja por tramos; `qtype` se ignora.
    Section,
}

#[derive(Debug, Clone, Copy)]
pub struct ShareEntry {
    pub label: &'static str,
    pub matcher: Matcher<'static>,
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub plant: Plant,
    /// Nombre en la ruta (`/api/process/inner/预处理/...`).
    pub route: &'static str,
    /// Alias ASCII de la ruta.
    pub alias: &'static str,
    /// Valor de la columna `工艺段`.
    pub segment: &'static str,
    pub units: TableSource,
    pub sections: TableSource,
    pub info_fields: &'static [UnitField],
    /// Qué hacer si el tramo no tiene unidades al pedir la información.
    pub info_missing: EmptyPolicy,
    pub trend: TrendSource,
    /// Los nombres de las series de electricidad y químicos llevan el nombre de la unidad.
    pub trend_prefixed: bool,
    pub share_dimension: &'static str,
    pub share_mapping: [&'static str; 2],
    pub share_entries: &'static [ShareEntry],
}

const fn exact(key: &'static str, unit: &'static str, reduce: Reduce) -> UnitField {
    UnitField { key, matcher: Matcher::Exact(unit), reduce }
}

const fn contains(key: &'static str, unit: &'static str) -> UnitField {
    UnitField { key, matcher: Matcher::Contains(unit), reduce: Reduce::Sum }
}

const OZONE_WORKSHOP: Matcher<'static> = Matcher::AnyOf(&["臭氧车间", "臭氧溶解/混合"]);

pub const SEGMENTS: &[SegmentSpec] = &[
    SegmentSpec {
        plant: Plant::Inner,
        route: "预处理",
        alias: "pretreatment",
        segment: "预处理段",
        units: INNER_UNITS,
        sections: INNER_SECTIONS,
        info_fields: &[
            exact("distributionWellPreOzoneContactTankCE", "配水井和预臭氧接触池", Reduce::First),
            exact("dosingRoomCE", "加药间", Reduce::First),
        ],
        info_missing: EmptyPolicy::NotFound,
        trend: TrendSource::Units(&[
            TrendTarget { name: "配水井和预臭氧接触池", matcher: Matcher::Contains("配水井和预臭氧接触池") },
            TrendTarget { name: "加药间", matcher: Matcher::Contains("加药间") },
        ]),
        trend_prefixed: false,
        share_dimension: "碳排结构",
        share_mapping: ["碳排结构", "数据值"],
        share_entries: &[
            ShareEntry { label: "配水井和预臭氧接触池", matcher: Matcher::Contains("配水井和预臭氧接触池") },
            ShareEntry { label: "加药间", matcher: Matcher::Contains("加药间") },
        ],
    },
    SegmentSpec {
        plant: Plant::Inner,
        route: "混凝沉淀",
        alias: "coagulation",
        segment: "混凝沉淀段",
        units: INNER_UNITS,
        sections: INNER_SECTIONS,
        info_fields: &[exact(
            "foldablePlateReactionHorizontalFlowSedimentationTankCE",
            "折板反应平流沉淀池",
            Reduce::First,
        )],
        info_missing: EmptyPolicy::Internal,
        trend: TrendSource::Units(&[TrendTarget {
            name: "折板反应平流沉淀池",
            matcher: Matcher::Exact("折板反应平流沉淀池"),
        }]),
        trend_prefixed: false,
        share_dimension: "碳排结构",
        share_mapping: ["碳排结构", "数据值"],
        share_entries: &[
            ShareEntry { label: "折板反应平流沉淀池", matcher: Matcher::Exact("折板反应平流沉淀池") },
            ShareEntry { label: "PAC投加", matcher: Matcher::Contains("PAC") },
        ],
    },
    SegmentSpec {
        plant: Plant::Inner,
        route: "深度处理",
        alias: "advanced",
        segment: "深度处理段",
        units: INNER_UNITS,
        sections: INNER_SECTIONS,
        info_fields: &[
            UnitField { key: "ozoneWorkshopCE", matcher: OZONE_WORKSHOP, reduce: Reduce::Sum },
            contains("mainOzoneContactTankCE", "臭氧接触池"),
            exact("flipPlateCarbonFilterCE", "翻板炭滤池", Reduce::Sum),
            exact("sodiumHypochloriteDosingRoomCE", "次氯酸钠投加间", Reduce::Sum),
        ],
        info_missing: EmptyPolicy::Internal,
        trend: TrendSource::Units(&[
            TrendTarget { name: "臭氧车间", matcher: OZONE_WORKSHOP },
            TrendTarget { name: "主臭氧接触池", matcher: Matcher::Contains("臭氧接触池") },
            TrendTarget { name: "翻板炭滤池", matcher: Matcher::Exact("翻板炭滤池") },
            TrendTarget { name: "次氯酸钠投加间", matcher: Matcher::Exact("次氯酸钠投加间") },
        ]),
        trend_prefixed: false,
        share_dimension: "工艺单元",
        share_mapping: ["工艺单元", "数据值"],
        share_entries: &[
            ShareEntry { label: "臭氧车间碳排", matcher: OZONE_WORKSHOP },
            ShareEntry { label: "主臭氧接触池碳排", matcher: Matcher::Contains("臭氧接触池") },
            ShareEntry { label: "翻板炭滤池碳排", matcher: Matcher::Exact("翻板炭滤池") },
            ShareEntry { label: "次氯酸钠投加间碳排", matcher: Matcher::Exact("次氯酸钠投加间") },
        ],
    },
    SegmentSpec {
        plant: Plant::Inner,
        route: "过滤",
        alias: "filtration",
        segment: "过滤段",
        units: INNER_UNITS,
        sections: INNER_SECTIONS,
        info_fields: &[
            exact("flipPlateSandFilterCE", "翻板砂滤池", Reduce::Sum),
            exact("sandFilterBackwashPumpHouseCE", "砂滤反冲洗泵房", Reduce::Sum),
            exact("carbonFilterBackwashPumpHouseCE", "炭滤反冲洗泵房", Reduce::Sum),
        ],
        info_missing: EmptyPolicy::Internal,
        trend: TrendSource::Section,
        trend_prefixed: false,
        share_dimension: "工艺单元",
        share_mapping: ["工艺单元", "数据值"],
        share_entries: &[
            ShareEntry { label: "翻板砂滤池碳排", matcher: Matcher::Exact("翻板砂滤池") },
            ShareEntry { label: "砂滤反冲洗泵房碳排", matcher: Matcher::Exact("砂滤反冲洗泵房") },
            ShareEntry { label: "炭滤反冲洗泵房碳排", matcher: Matcher::Exact("炭滤反冲洗泵房") },
        ],
    },
    // 清水处理 cuelga de la ruta inner pero sus datos son del 供水段 (hojas 水厂外)
    SegmentSpec {
        plant: Plant::Inner,
        route: "清水处理",
        alias: "clearwater",
        segment: "供水段",
        units: OUTER_UNITS,
        sections: OUTER_SECTIONS,
        info_fields: &[
            contains("clearWaterTankCE", "清水池"),
            contains("ordinaryWaterRegulationCE", "普通水调节"),
        ],
        info_missing: EmptyPolicy::Internal,
        trend: TrendSource::Section,
        trend_prefixed: false,
        share_dimension: "工艺单元",
        share_mapping: ["工艺单元", "数据值"],
        share_entries: &[
            ShareEntry { label: "清水池碳排", matcher: Matcher::Contains("清水池") },
            ShareEntry { label: "普通水调节池碳排", matcher: Matcher::Contains("普通水调节") },
            ShareEntry { label: "送水泵房碳排", matcher: Matcher::Contains("送水泵房") },
        ],
    },
    SegmentSpec {
        plant: Plant::Outer,
        route: "原水取水",
        alias: "rawwater",
        segment: "原水取水段",
        units: OUTER_UNITS,
        sections: OUTER_SECTIONS,
        info_fields: &[
            contains("rawWaterLiftingPumpHouseCE", "原水提升"),
            contains("waterIntakePumpingStationCE", "取水泵站"),
            contains("sodiumHypochloriteRoomCE", "次氯酸钠"),
        ],
        info_missing: EmptyPolicy::Internal,
        trend: TrendSource::Units(&[
            TrendTarget { name: "原水提升泵房", matcher: Matcher::Contains("原水提升") },
            TrendTarget { name: "取水泵站", matcher: Matcher::Contains("取水泵站") },
            TrendTarget { name: "次氯酸钠间", matcher: Matcher::Contains("次氯酸钠") },
        ]),
        trend_prefixed: true,
        share_dimension: "碳排结构",
        share_mapping: ["product", "数据值"],
        share_entries: &[
            ShareEntry { label: "原水提升泵房", matcher: Matcher::Contains("原水提升") },
            ShareEntry { label: "取水泵站", matcher: Matcher::Contains("取水泵站") },
            ShareEntry { label: "次氯酸钠间", matcher: Matcher::Contains("次氯酸钠") },
        ],
    },
];

/// Busca un tramo por planta y nombre de ruta (chino o alias ASCII).
pub fn find_segment(plant: &str, name: &str) -> ApiResult<&'static SegmentSpec> {
    let name = name.trim();
    SEGMENTS
        .iter()
        .find(|s| s.plant.route() == plant && (s.route == name || s.alias.eq_ignore_ascii_case(name)))
        .ok_or_else(|| ApiError::NotFound(format!("未知工艺段：{}/{}", plant, name)))
}

impl SegmentSpec {
    fn segment_filter(&self) -> Filter<'static> {
        Filter::new().exact(SEGMENT_COL, self.segment)
    }

    /// Total del tramo y campos por unidad sobre `合计_X`.
    pub fn info(&self, units: &Table, period: Period) -> ApiResult<Value> {
        let col = period.column("合计");
        let total = aggregate(units, &self.segment_filter(), &col, Reduce::Sum, self.info_missing)?;

        let mut data = serde_json::Map::new();
        data.insert("totalCarbonEmissions".to_string(), json!(total));
        for field in self.info_fields {
            let filter = self.segment_filter().label(UNIT_COL, field.matcher);
            let value = aggregate(units, &filter, &col, field.reduce, EmptyPolicy::Zero)?;
            data.insert(field.key.to_string(), json!(value));
        }
        Ok(Value::Object(data))
    }

    /// Gráfico de líneas de un solo punto con 总碳排 / 电耗碳排 / 药耗碳排.
    ///
    /// Para tramos por unidad `qtype` es 1-based; fuera de rango → 400.
    pub fn trend(&self, units: &Table, sections: &Table, period: Period, qtype: i64) -> ApiResult<Value> {
        let cols = [period.column("合计"), period.column("电耗"), period.column("药耗")];
        let (table, filter, unit_name) = match self.trend {
            TrendSource::Units(targets) => {
                let target = usize::try_from(qtype)
                    .ok()
                    .and_then(|q| q.checked_sub(1))
                    .and_then(|i| targets.get(i))
                    .ok_or_else(|| {
                        let options: Vec<String> =
                            targets.iter().enumerate().map(|(i, t)| format!("{}({})", i + 1, t.name)).collect();
                        ApiError::InvalidArgument(format!("qtype 只能是 {}", options.join("/")))
                    })?;
                // el tramo debe existir aunque la unidad falte
                aggregate(units, &self.segment_filter(), &cols[0], Reduce::Sum, EmptyPolicy::Internal)?;
                (units, self.segment_filter().label(UNIT_COL, target.matcher), Some(target.name))
            }
            TrendSource::Section => (sections, self.segment_filter(), None),
        };

        let missing = if unit_name.is_some() { EmptyPolicy::NotFound } else { EmptyPolicy::Internal };
        let total = aggregate(table, &filter, &cols[0], Reduce::Sum, missing)?;
        let elec = aggregate(table, &filter, &cols[1], Reduce::Sum, missing)?;
        let chem = aggregate(table, &filter, &cols[2], Reduce::Sum, missing)?;

        let prefix = if self.trend_prefixed { unit_name.unwrap_or_default() } else { "" };
        Ok(trend_chart(
            period,
            &[
                ("总碳排".to_string(), total),
                (format!("{}电耗碳排", prefix), elec),
                (format!("{}药耗碳排", prefix), chem),
            ],
        ))
    }

    /// Reparto interno del tramo a partir de `段内占比_X`.
    pub fn share(&self, units: &Table, period: Period) -> ApiResult<Value> {
        let col = period.column("段内占比");
        aggregate(units, &self.segment_filter(), &col, Reduce::Sum, EmptyPolicy::Internal)?;

        let mut source = Vec::with_capacity(self.share_entries.len());
        for entry in self.share_entries {
            let filter = self.segment_filter().label(UNIT_COL, entry.matcher);
            let value = aggregate(units, &filter, &col, Reduce::Sum, EmptyPolicy::Zero)?;
            let mut item = serde_json::Map::new();
            item.insert(self.share_dimension.to_string(), json!(entry.label));
            item.insert("数据值".to_string(), json!(value));
            source.push(Value::Object(item));
        }

        Ok(json!({
            "dimensions": [self.share_dimension, "数据值"],
            "source": source,
            "dimensionsMapping": self.share_mapping,
        }))
    }
}

pub fn trend_chart(period: Period, series: &[(String, f64)]) -> Value {
    let series: Vec<Value> = series
        .iter()
        .map(|(name, value)| json!({ "name": name, "type": "line", "data": [value] }))
        .collect();
    json!({
        "id": "80",
        "styleType": "0",
        "customOption": {},
        "xAxis": [{ "type": "category", "name": "", "data": [period.label()] }],
        "yAxis": [{ "name": "kgCO₂e", "type": "value" }],
        "series": series,
        "colors": TREND_COLORS,
    })
}
