//! Chart scenes for an evaluation record

use crate::{ChartResult, ChartScene, ChartSlot, Primitive, Rgba};
use capture::{Canvas, ChartBoard, ElementSize};
use report_model::classify::{BodyClass, PerimeterRatios};
use report_model::EvaluationRecord;
use std::f64::consts::PI;
use std::sync::Arc;

const FAT: Rgba = Rgba::opaque(239, 68, 68);
const LEAN: Rgba = Rgba::opaque(34, 197, 94);
const LEFT: Rgba = Rgba::opaque(59, 130, 246);
const RATIO_COLORS: [Rgba; 3] = [
    Rgba::opaque(255, 107, 53),
    Rgba::opaque(59, 130, 246),
    Rgba::opaque(16, 185, 129),
];

/// Plot area inside a chart, leaving room for axes
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn inset(size: ElementSize, margin: f64) -> Self {
        Self {
            left: margin,
            top: margin,
            width: (size.width - margin * 2.0).max(1.0),
            height: (size.height - margin * 2.0).max(1.0),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Upper bound for a value axis: the max rounded up to a step of 10
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        (max / 10.0).ceil() * 10.0
    }
}

fn axes(scene: &mut ChartScene, area: PlotArea) {
    for step in 1..=4 {
        let y = area.bottom() - area.height * step as f64 / 4.0;
        scene.push(Primitive::Line {
            from: (area.left, y),
            to: (area.left + area.width, y),
            color: Rgba::GRID,
            width: 1.0,
        });
    }
    scene.push(Primitive::Line {
        from: (area.left, area.top),
        to: (area.left, area.bottom()),
        color: Rgba::AXIS,
        width: 1.0,
    });
    scene.push(Primitive::Line {
        from: (area.left, area.bottom()),
        to: (area.left + area.width, area.bottom()),
        color: Rgba::AXIS,
        width: 1.0,
    });
}

fn bar(scene: &mut ChartScene, area: PlotArea, x: f64, width: f64, value: f64, max: f64, fill: Rgba) {
    let height = area.height * (value.max(0.0) / max).min(1.0);
    scene.push(Primitive::Rect {
        x,
        y: area.bottom() - height,
        width,
        height,
        fill,
    });
}

/// Radar of the seven skinfolds
pub fn fat_distribution(record: &EvaluationRecord) -> ChartScene {
    let size = ChartSlot::FatDistribution.layout_size();
    let mut scene = ChartScene::new(size);
    let skinfolds = record.skinfolds();
    let center = (size.width / 2.0, size.height / 2.0);
    let radius = size.width.min(size.height) / 2.0 - 20.0;
    let max = axis_max(skinfolds.iter().map(|m| m.value.unwrap_or(0.0)));
    let count = skinfolds.len();

    let vertex = |fraction: f64, i: usize| {
        let angle = 2.0 * PI * i as f64 / count as f64;
        (
            center.0 + radius * fraction * angle.sin(),
            center.1 - radius * fraction * angle.cos(),
        )
    };

    for ring in 1..=5 {
        let fraction = ring as f64 / 5.0;
        scene.push(Primitive::Polygon {
            points: (0..count).map(|i| vertex(fraction, i)).collect(),
            fill: None,
            stroke: Some((Rgba::GRID, 1.0)),
        });
    }
    for i in 0..count {
        scene.push(Primitive::Line {
            from: center,
            to: vertex(1.0, i),
            color: Rgba::GRID,
            width: 1.0,
        });
    }

    let points = skinfolds
        .iter()
        .enumerate()
        .map(|(i, m)| vertex((m.value.unwrap_or(0.0).max(0.0) / max).min(1.0), i))
        .collect();
    scene.push(Primitive::Polygon {
        points,
        fill: Some(FAT.with_alpha(51)),
        stroke: Some((FAT, 2.0)),
    });
    scene
}

/// Right vs left limb perimeters, grouped bars
pub fn muscle_balance(record: &EvaluationRecord) -> ChartScene {
    let size = ChartSlot::MuscleBalance.layout_size();
    let mut scene = ChartScene::new(size);
    let area = PlotArea::inset(size, 24.0);
    axes(&mut scene, area);

    let pairs = [
        (record.perimeter_arm_r, record.perimeter_arm_l),
        (record.perimeter_forearm_r, record.perimeter_forearm_l),
        (record.perimeter_thigh_r, record.perimeter_thigh_l),
        (record.perimeter_leg_r, record.perimeter_leg_l),
    ];
    let max = axis_max(
        pairs
            .iter()
            .flat_map(|(r, l)| [r.unwrap_or(0.0), l.unwrap_or(0.0)]),
    );

    let group_width = area.width / pairs.len() as f64;
    let bar_width = group_width * 0.35;
    for (i, (right, left)) in pairs.iter().enumerate() {
        let x = area.left + group_width * i as f64 + group_width * 0.15;
        bar(&mut scene, area, x, bar_width, right.unwrap_or(0.0), max, LEAN.with_alpha(153));
        bar(&mut scene, area, x + bar_width, bar_width, left.unwrap_or(0.0), max, LEFT.with_alpha(153));
    }
    scene
}

/// Doughnut of fat vs lean mass percentages
pub fn body_composition(record: &EvaluationRecord) -> ChartScene {
    let size = ChartSlot::BodyComposition.layout_size();
    let mut scene = ChartScene::new(size);
    let center = (size.width / 2.0, size.height / 2.0);
    let outer = size.width.min(size.height) / 2.0 - 16.0;
    let inner = outer * 0.5;

    let fat = record.fat_percentage.unwrap_or(0.0).max(0.0);
    let lean = record.lean_mass_percentage.unwrap_or(0.0).max(0.0);
    let total = fat + lean;
    if total <= 0.0 {
        scene.push(Primitive::Wedge {
            center,
            inner_radius: inner,
            outer_radius: outer,
            start_angle: 0.0,
            sweep: 2.0 * PI,
            fill: Rgba::GRID,
        });
        return scene;
    }

    let mut start = 0.0;
    for (value, color) in [(fat, FAT), (lean, LEAN)] {
        let sweep = 2.0 * PI * value / total;
        if sweep > 0.0 {
            scene.push(Primitive::Wedge {
                center,
                inner_radius: inner,
                outer_radius: outer,
                start_angle: start,
                sweep,
                fill: color.with_alpha(204),
            });
        }
        start += sweep;
    }
    scene
}

/// Waist/hip, waist/chest and waist/height (%) bars
pub fn perimeter_ratio(record: &EvaluationRecord) -> ChartScene {
    let size = ChartSlot::PerimeterRatio.layout_size();
    let mut scene = ChartScene::new(size);
    let area = PlotArea::inset(size, 24.0);
    axes(&mut scene, area);

    let ratios = PerimeterRatios::from_record(record);
    let values = [ratios.waist_hip, ratios.waist_chest, ratios.waist_height_pct];
    let max = axis_max(values.iter().copied());

    let slot_width = area.width / values.len() as f64;
    for (i, value) in values.iter().enumerate() {
        let x = area.left + slot_width * i as f64 + slot_width * 0.2;
        bar(&mut scene, area, x, slot_width * 0.6, *value, max, RATIO_COLORS[i].with_alpha(153));
    }
    scene
}

/// Ring in the color of the student's body class
pub fn body_classification(record: &EvaluationRecord) -> ChartScene {
    let size = ChartSlot::BodyClassification.layout_size();
    let mut scene = ChartScene::new(size);
    let class = BodyClass::classify(record.imc, record.fat_percentage);
    let center = (size.width / 2.0, size.height / 2.0);
    let outer = size.width.min(size.height) / 2.0 - 12.0;

    scene.push(Primitive::Wedge {
        center,
        inner_radius: outer * 0.5,
        outer_radius: outer,
        start_angle: 0.0,
        sweep: 2.0 * PI,
        fill: Rgba::from_rgb(class.color()).with_alpha(153),
    });
    // scale ticks, one per class, current one emphasised
    for (i, candidate) in BodyClass::ALL.iter().enumerate() {
        let angle = 2.0 * PI * i as f64 / BodyClass::ALL.len() as f64;
        let (sin, cos) = angle.sin_cos();
        let color = if *candidate == class {
            Rgba::from_rgb(candidate.color())
        } else {
            Rgba::WHITE
        };
        scene.push(Primitive::Line {
            from: (center.0 + outer * 0.5 * sin, center.1 - outer * 0.5 * cos),
            to: (center.0 + outer * sin, center.1 - outer * cos),
            color,
            width: 2.0,
        });
    }
    scene
}

pub fn build_scene(slot: ChartSlot, record: &EvaluationRecord) -> ChartScene {
    match slot {
        ChartSlot::FatDistribution => fat_distribution(record),
        ChartSlot::MuscleBalance => muscle_balance(record),
        ChartSlot::BodyComposition => body_composition(record),
        ChartSlot::PerimeterRatio => perimeter_ratio(record),
        ChartSlot::BodyClassification => body_classification(record),
    }
}

/// Mount all five charts as offscreen-renderable elements
pub fn mount_evaluation_charts(board: &mut ChartBoard, record: &EvaluationRecord) {
    for slot in ChartSlot::ALL {
        board.mount_element(slot.key(), Arc::new(build_scene(slot, record)));
    }
    tracing::debug!("Mounted {} evaluation charts", ChartSlot::ALL.len());
}

/// Draw one chart onto a live canvas at `scale`
pub fn paint_canvas(slot: ChartSlot, record: &EvaluationRecord, scale: f64) -> ChartResult<Canvas> {
    let image = crate::render_scene(&build_scene(slot, record), scale)?;
    Ok(Canvas::new(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{CaptureOptions, ChartCapturer, ChartElement};
    use std::time::Duration;

    fn sample() -> EvaluationRecord {
        EvaluationRecord {
            date: "2024-03-05".to_string(),
            height_m: Some(1.72),
            imc: Some(23.4),
            fat_percentage: Some(18.0),
            lean_mass_percentage: Some(82.0),
            skinfold_triceps: Some(12.0),
            skinfold_subscapular: Some(15.0),
            skinfold_abdominal: Some(22.5),
            perimeter_arm_r: Some(33.0),
            perimeter_arm_l: Some(32.0),
            perimeter_thigh_r: Some(55.0),
            perimeter_thigh_l: Some(54.5),
            perimeter_waist: Some(82.0),
            perimeter_hip: Some(98.0),
            perimeter_chest: Some(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_slot_renders_at_layout_size() {
        let record = sample();
        for slot in ChartSlot::ALL {
            let scene = build_scene(slot, &record);
            assert_eq!(scene.measure(), slot.layout_size());
            let image = scene.rasterize(1.0).unwrap();
            assert_eq!(image.width() as f64, slot.layout_size().width);
            assert!(!image.is_blank());
        }
    }

    #[test]
    fn test_empty_record_still_renders() {
        let record = EvaluationRecord::default();
        for slot in ChartSlot::ALL {
            assert!(build_scene(slot, &record).rasterize(0.5).is_ok());
        }
    }

    #[test]
    fn test_composition_splits_by_share() {
        let scene = body_composition(&sample());
        let sweeps: Vec<f64> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Wedge { sweep, .. } => Some(*sweep),
                _ => None,
            })
            .collect();
        assert_eq!(sweeps.len(), 2);
        assert!((sweeps[0] - 2.0 * PI * 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_axis_max() {
        assert_eq!(axis_max([3.0, 27.0].into_iter()), 30.0);
        assert_eq!(axis_max([0.0].into_iter()), 1.0);
        assert_eq!(axis_max(std::iter::empty()), 1.0);
    }

    #[test]
    fn test_paint_canvas() {
        let canvas = paint_canvas(ChartSlot::MuscleBalance, &sample(), 2.0).unwrap();
        assert_eq!(canvas.dimensions(), (960, 600));
    }

    #[tokio::test]
    async fn test_mounted_charts_capture() {
        let mut board = ChartBoard::new();
        mount_evaluation_charts(&mut board, &sample());
        assert_eq!(board.len(), 5);

        let capturer = ChartCapturer::new(CaptureOptions {
            scale: 1.0,
            settle_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(10),
        });
        let keys: Vec<&str> = ChartSlot::ALL.iter().map(|s| s.key()).collect();
        let outcomes = capturer.capture_all(&board, &keys).await;
        assert!(outcomes.iter().all(|(_, o)| o.is_captured()));
        let classification = outcomes[4].1.capture().unwrap();
        assert_eq!((classification.width, classification.height), (250, 250));
    }
}
