// Generation policy: the steering instruction and model for every request
//
// The system instruction travels on the API's dedicated system channel and is
// never interleaved with the content parts.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;

use crate::config::constants::DEFAULT_MODEL;
use crate::config::GenerationConfig;

/// Built-in instruction for the portrait-prompt agent.
///
/// Identity preservation for selfies is part of the fixed text; the
/// per-request selfie marker only tells the model a selfie is present.
pub const PROMPTRAITS_SYSTEM_INSTRUCTION: &str = "\
System prompt para agente generador de retratos ultra realistas
Eres Promptraits, un agente experto en crear descripciones hiperrealistas (prompts) para modelos de generación de imágenes. Tu función es entrevistar al usuario, comprender qué tipo de retrato desea y sintetizar toda la información en un único prompt extremadamente detallado y técnico. Dicho prompt se utilizará para generar imágenes fotorrealistas de retratos y debe garantizar que se mantiene la identidad facial de la persona retratada.
Base de conocimiento
Cuentas con una base de datos interna que incluye manuales de Capture One Pro, guías completas de fotografía profesional (iluminación, composición y emoción) y un manual de filtros fotográficos y cinematográficos. Utiliza estos documentos para:
•\tComprender y aplicar estilos fotográficos (editorial, cinematográfico, moda, retrato clásico) y técnicas de iluminación, composición y color.
•\tAplicar ajustes técnicos (exposición, balance de blancos, curvas, capas) y filtros creativos o cinematográficos, sabiendo cuándo es necesario ajustarlos o cuándo mantener la naturalidad de la imagen.
•\tEvitar errores comunes y emplear herramientas como Capture One Pro para modificar fondos, aplicar bokeh, controlar la luz o transferir estilos, preservando siempre la textura y los detalles faciales.
Principios generales
1.\tEstructura básica del prompt – Un prompt eficaz indica qué se va a mostrar, el estilo/estado de ánimo y los parámetros técnicos.
2.\tPreservación de identidad – Si se proporciona una imagen selfie, la IA debe generar el rostro con el 100% de los rasgos, textura de piel y cabello de la foto original, sin retoques, suavizado o alteración de la edad.
3.\tAdaptación de Referencia – Si se adjunta una imagen de referencia, extrae y aplica su esquema de iluminación, vestuario, pose y composición al rostro del usuario.
4.\tTono – Mantén un tono profesional, técnico y editorial.

Protocolos de salida
•\tTu respuesta debe ser un prompt monolítico, sin separaciones ni enumeraciones, pero claramente dividido por comas y guiones para la legibilidad del modelo de IA.
•\tEl prompt debe contener los bloques técnicos (cámara, óptica, iluminación, postprocesado) que el usuario necesita.
•\tAl final del prompt incluye una sección de Keywords.

Reglas de Contenido
•\tSi no hay selfie, genera un sujeto genérico (unisex/neutro) con la descripción, listo para ser sustituido si el usuario envía una más tarde.
•\tSi se proporciona una imagen de referencia sin especificar el estilo, replícalo.

Estructura del Prompt (EN) ten en cuenta el documento de referencia (obligatorio): Antes de redactar cualquier salida, lee y aplica el archivo de conocimiento “FORMATO OBLIGATORIO DEL PROMPT.txt”. Trátalo como fuente de verdad para la estructura y estilo del prompt (8 líneas, sin encabezados). Si el archivo contradice cualquier instrucción, prevalece el archivo. Si el archivo no está disponible/legible, replica fielmente el formato de 8 líneas indicado en este System Prompt y declara internamente que se ha usado el fallback (no lo menciones en la respuesta al usuario).

Regla Crucial para la API: Tu respuesta final debe ser solo texto plano o, preferiblemente, un objeto JSON si la aplicación lo necesita para su estructura.
Tienes prohibido usar cualquier tipo de saludo o despedida.
";

/// Instruction text and model identifier applied to every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPolicy {
    pub system_instruction: Cow<'static, str>,
    pub model: String,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self::promptraits()
    }
}

impl GenerationPolicy {
    /// Built-in portrait-prompt policy
    pub fn promptraits() -> Self {
        Self {
            system_instruction: Cow::Borrowed(PROMPTRAITS_SYSTEM_INSTRUCTION),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Policy from configuration, reading an instruction override file if one is set
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let system_instruction = match &config.system_instruction_path {
            Some(path) => Cow::Owned(read_instruction(path)?),
            None => Cow::Borrowed(PROMPTRAITS_SYSTEM_INSTRUCTION),
        };

        Ok(Self {
            system_instruction,
            model: config.model.clone(),
        })
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Cow::Owned(instruction.into());
        self
    }
}

fn read_instruction(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read system instruction {}", path.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("System instruction file {} is empty", path.display());
    }
    tracing::info!("Using system instruction from {}", path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_policy() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.model, "gemini-2.5-flash");
        assert!(policy.system_instruction.starts_with("System prompt"));
        assert!(policy.system_instruction.contains("Preservación de identidad"));
    }

    #[test]
    fn test_from_config_uses_model_and_builtin_text() {
        let config = GenerationConfig {
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };
        let policy = GenerationPolicy::from_config(&config).unwrap();
        assert_eq!(policy.model, "gemini-1.5-pro");
        assert_eq!(policy.system_instruction, PROMPTRAITS_SYSTEM_INSTRUCTION);
    }

    #[test]
    fn test_instruction_override_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("instruction.txt");
        std::fs::write(&path, "Be terse.").unwrap();

        let config = GenerationConfig {
            system_instruction_path: Some(path),
            ..Default::default()
        };
        let policy = GenerationPolicy::from_config(&config).unwrap();
        assert_eq!(policy.system_instruction, "Be terse.");
    }

    #[test]
    fn test_missing_override_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = GenerationConfig {
            system_instruction_path: Some(tmp.path().join("missing.txt")),
            ..Default::default()
        };
        assert!(GenerationPolicy::from_config(&config).is_err());
    }

    #[test]
    fn test_empty_override_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blank.txt");
        std::fs::write(&path, "  \n").unwrap();

        let config = GenerationConfig {
            system_instruction_path: Some(path),
            ..Default::default()
        };
        assert!(GenerationPolicy::from_config(&config).is_err());
    }
}
