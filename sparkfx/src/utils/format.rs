//! Formatting utilities

use fx_data::Rgba;
use fx_particles::{
    EmitterShape, Modifier, ModifierCollection, RemainingLife, Variable, VariableValue,
};
use glam::Vec2;

/// Format a sampled range, collapsing constant ranges to a single value
pub fn format_variable<T, F>(variable: &Variable<T>, format_value: F) -> String
where
    T: VariableValue,
    F: Fn(T) -> String,
{
    if variable.is_constant() {
        format_value(variable.min)
    } else {
        format!("{}..{}", format_value(variable.min), format_value(variable.max))
    }
}

/// Format a color as `#RRGGBBAA`
pub fn format_color(color: Rgba) -> String {
    format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        color.r, color.g, color.b, color.a
    )
}

pub fn format_vec2(value: Vec2) -> String {
    format!("({:.1}, {:.1})", value.x, value.y)
}

/// Format radians as degrees
pub fn format_angle(radians: f32) -> String {
    format!("{:.1}°", radians.to_degrees())
}

/// Format a configured emitter life in milliseconds
pub fn format_emitter_life(emitter_life: i32) -> String {
    if emitter_life < 0 {
        RemainingLife::Infinite.to_string()
    } else {
        RemainingLife::Millis(i64::from(emitter_life)).to_string()
    }
}

/// One-line description of a shape's custom settings
pub fn format_shape(shape: &EmitterShape) -> String {
    match shape {
        EmitterShape::Cone(cone) => format!(
            "cone, direction {}, spread {}",
            format_angle(cone.direction),
            format_angle(cone.cone_angle)
        ),
        EmitterShape::Rect(rect) => format!(
            "rect {}x{}, {}",
            rect.width(),
            rect.height(),
            if rect.perimeter { "perimeter" } else { "filled" }
        ),
        EmitterShape::Polygon(polygon) => format!(
            "polygon, {} points, {}, scale {:.2}, rotation {}",
            polygon.points().len(),
            if polygon.closed() { "closed" } else { "open" },
            polygon.scale(),
            format_angle(polygon.rotation())
        ),
    }
}

/// Comma separated modifier type names, or `-` when there are none
pub fn format_modifiers<M: Modifier>(modifiers: &ModifierCollection<M>) -> String {
    if modifiers.is_empty() {
        "-".to_string()
    } else {
        modifiers
            .iter()
            .map(Modifier::type_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_particles::{ConeShape, ParticleModifier, ParticleModifierCollection, RectShape};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_format_variable() {
        assert_eq!(format_variable(&Variable::constant(50u16), |v| v.to_string()), "50");
        assert_eq!(
            format_variable(&Variable::new(100, 900), |v: i32| format!("{v}ms")),
            "100ms..900ms"
        );
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(Rgba::WHITE), "#FFFFFFFF");
        assert_eq!(format_color(Rgba::new(255, 64, 0, 128)), "#FF400080");
    }

    #[test]
    fn test_format_emitter_life() {
        assert_eq!(format_emitter_life(-1), "infinite");
        assert_eq!(format_emitter_life(1500), "1500ms");
    }

    #[test]
    fn test_format_shape() {
        let cone = EmitterShape::from(ConeShape::new(-FRAC_PI_2, 0.0));
        assert_eq!(format_shape(&cone), "cone, direction -90.0°, spread 0.0°");

        let rect = EmitterShape::from(RectShape::new(64, 16, true).unwrap());
        assert_eq!(format_shape(&rect), "rect 64x16, perimeter");
    }

    #[test]
    fn test_format_modifiers() {
        let mut modifiers = ParticleModifierCollection::new();
        assert_eq!(format_modifiers(&modifiers), "-");

        modifiers.push(ParticleModifier::Spin { rate: 1.0 });
        modifiers.push(ParticleModifier::Drag { factor: 0.5 });
        assert_eq!(format_modifiers(&modifiers), "Spin, Drag");
    }
}
