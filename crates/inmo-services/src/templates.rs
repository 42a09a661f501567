//! Static message templates with `{placeholder}` substitution.

use inmo_core::error::InmoError;
use inmo_core::traits::TemplateRenderer;
use serde_json::Value;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "cliente_registrado",
        "✅ Cliente {nombre} {apellido} registrado correctamente (ID {id}).",
    ),
    (
        "propiedad_registrada",
        "✅ Propiedad {nombre} registrada correctamente (ID {id}).",
    ),
    (
        "usuario_registrado",
        "✅ Usuario {nombre} registrado con rol {rol} (ID {id}).",
    ),
    (
        "difusion_terminada",
        "Difusión terminada: {sent} enviados, {errors} errores en {elapsed_seconds}s.",
    ),
];

/// Renderer over the fixed template table. Placeholders with no matching
/// key in the data object are left as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTemplates;

impl TemplateRenderer for StaticTemplates {
    fn render(&self, template_id: &str, data: &Value) -> Result<String, InmoError> {
        let Some((_, text)) = TEMPLATES.iter().find(|(id, _)| *id == template_id) else {
            return Err(InmoError::NotFound(format!("plantilla {template_id}")));
        };

        let mut out = text.to_string();
        if let Some(map) = data.as_object() {
            for (key, value) in map {
                let needle = format!("{{{key}}}");
                let replacement = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out = out.replace(&needle, &replacement);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitutes_placeholders() {
        let rendered = StaticTemplates
            .render(
                "cliente_registrado",
                &json!({ "nombre": "Juan", "apellido": "Perez", "id": "C-7" }),
            )
            .unwrap();
        assert_eq!(
            rendered,
            "✅ Cliente Juan Perez registrado correctamente (ID C-7)."
        );
    }

    #[test]
    fn test_numeric_values_render_bare() {
        let rendered = StaticTemplates
            .render(
                "difusion_terminada",
                &json!({ "sent": 12, "errors": 0, "elapsed_seconds": 95 }),
            )
            .unwrap();
        assert_eq!(rendered, "Difusión terminada: 12 enviados, 0 errores en 95s.");
    }

    #[test]
    fn test_missing_key_leaves_placeholder() {
        let rendered = StaticTemplates
            .render("cliente_registrado", &json!({ "nombre": "Juan" }))
            .unwrap();
        assert!(rendered.contains("{apellido}"));
    }

    #[test]
    fn test_unknown_template_is_not_found() {
        let err = StaticTemplates
            .render("no_existe", &json!({}))
            .unwrap_err();
        assert!(matches!(err, InmoError::NotFound(_)));
    }
}
