// Copyright 2025 Cowboy AI, LLC.

//! Entities owned by the HES aggregate
//!
//! Each entity validates its own local invariants in its constructor and is
//! replaced wholesale through the aggregate (never mutated in place from the
//! outside). Deserialization is the hydration path: it trusts persisted data
//! and performs no re-validation.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Client identification block of a service entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClienteInfo {
    nombre: String,
    identificacion: String,
    telefono: Option<String>,
    email: Option<String>,
    direccion: Option<String>,
}

impl ClienteInfo {
    /// Validating constructor
    pub fn new(
        nombre: impl Into<String>,
        identificacion: impl Into<String>,
        telefono: Option<String>,
        email: Option<String>,
        direccion: Option<String>,
    ) -> DomainResult<Self> {
        let nombre = nombre.into();
        if nombre.trim().chars().count() < 2 {
            return Err(DomainError::validation(
                "cliente.nombre",
                "must be at least 2 characters",
            ));
        }
        let identificacion = identificacion.into();
        if identificacion.trim().is_empty() {
            return Err(DomainError::validation(
                "cliente.identificacion",
                "must not be empty",
            ));
        }
        if let Some(ref email) = email {
            if !email.contains('@') {
                return Err(DomainError::validation(
                    "cliente.email",
                    "must contain '@'",
                ));
            }
        }
        Ok(Self {
            nombre,
            identificacion,
            telefono,
            email,
            direccion,
        })
    }

    /// Client name
    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    /// Tax/identity number
    pub fn identificacion(&self) -> &str {
        &self.identificacion
    }

    /// Contact phone, if recorded
    pub fn telefono(&self) -> Option<&str> {
        self.telefono.as_deref()
    }

    /// Contact email, if recorded
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Service address, if recorded
    pub fn direccion(&self) -> Option<&str> {
        self.direccion.as_deref()
    }
}

/// Site conditions observed when the technician arrives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CondicionesEntrada {
    descripcion: String,
    tiene_danos_visibles: bool,
    fotografias: Vec<String>,
    registrada_en: DateTime<Utc>,
}

impl CondicionesEntrada {
    /// Validating constructor; the capture timestamp is server-assigned
    pub fn new(
        descripcion: impl Into<String>,
        tiene_danos_visibles: bool,
        fotografias: Vec<String>,
    ) -> DomainResult<Self> {
        let descripcion = descripcion.into();
        if descripcion.trim().is_empty() {
            return Err(DomainError::validation(
                "condiciones.descripcion",
                "must not be empty",
            ));
        }
        if fotografias.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::validation(
                "condiciones.fotografias",
                "photograph references must not be empty",
            ));
        }
        Ok(Self {
            descripcion,
            tiene_danos_visibles,
            fotografias,
            registrada_en: Utc::now(),
        })
    }

    /// Free-text description of the site state
    pub fn descripcion(&self) -> &str {
        &self.descripcion
    }

    /// Whether visible damage was found on arrival
    pub fn tiene_danos_visibles(&self) -> bool {
        self.tiene_danos_visibles
    }

    /// Photograph references (storage keys or URLs)
    pub fn fotografias(&self) -> &[String] {
        &self.fotografias
    }

    /// Whether at least one photograph was attached
    pub fn tiene_fotografias(&self) -> bool {
        !self.fotografias.is_empty()
    }

    /// When the conditions were recorded
    pub fn registrada_en(&self) -> DateTime<Utc> {
        self.registrada_en
    }
}

/// Technician's preliminary diagnosis before work begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticoPreliminar {
    descripcion: String,
    recomendaciones: Option<String>,
    requiere_repuestos: bool,
    repuestos_estimados: Option<String>,
}

impl DiagnosticoPreliminar {
    /// Validating constructor
    pub fn new(
        descripcion: impl Into<String>,
        recomendaciones: Option<String>,
        requiere_repuestos: bool,
        repuestos_estimados: Option<String>,
    ) -> DomainResult<Self> {
        let descripcion = descripcion.into();
        if descripcion.trim().chars().count() < 10 {
            return Err(DomainError::validation(
                "diagnostico.descripcion",
                "must be at least 10 characters",
            ));
        }
        if requiere_repuestos
            && repuestos_estimados
                .as_deref()
                .map(|r| r.trim().is_empty())
                .unwrap_or(true)
        {
            return Err(DomainError::validation(
                "diagnostico.repuestos_estimados",
                "required when spare parts are needed",
            ));
        }
        Ok(Self {
            descripcion,
            recomendaciones,
            requiere_repuestos,
            repuestos_estimados,
        })
    }

    /// Diagnosis text
    pub fn descripcion(&self) -> &str {
        &self.descripcion
    }

    /// Recommended follow-up, if any
    pub fn recomendaciones(&self) -> Option<&str> {
        self.recomendaciones.as_deref()
    }

    /// Whether spare parts are needed
    pub fn requiere_repuestos(&self) -> bool {
        self.requiere_repuestos
    }

    /// Estimated spare parts, when needed
    pub fn repuestos_estimados(&self) -> Option<&str> {
        self.repuestos_estimados.as_deref()
    }
}

/// Safety checklist that must be fully verified before completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequerimientosSeguridad {
    // Ordered so completion reports list items in declaration order
    items: IndexMap<String, bool>,
    contiene_riesgos_altos: bool,
}

impl RequerimientosSeguridad {
    /// Validating constructor; the checklist must name at least one item
    pub fn new(items: IndexMap<String, bool>, contiene_riesgos_altos: bool) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation(
                "seguridad.items",
                "checklist must contain at least one item",
            ));
        }
        if items.keys().any(|k| k.trim().is_empty()) {
            return Err(DomainError::validation(
                "seguridad.items",
                "checklist item names must not be empty",
            ));
        }
        Ok(Self {
            items,
            contiene_riesgos_altos,
        })
    }

    /// Checklist items in declaration order
    pub fn items(&self) -> &IndexMap<String, bool> {
        &self.items
    }

    /// Whether the entry flags high-risk conditions
    pub fn contiene_riesgos_altos(&self) -> bool {
        self.contiene_riesgos_altos
    }

    /// Percentage of checked items, 0.0-100.0
    pub fn porcentaje_completado(&self) -> f64 {
        let total = self.items.len();
        let marcados = self.items.values().filter(|v| **v).count();
        (marcados as f64 / total as f64) * 100.0
    }

    /// Whether every item is checked
    pub fn esta_completo(&self) -> bool {
        self.items.values().all(|v| *v)
    }

    /// Check or uncheck an item; returns false when the item does not exist
    pub fn marcar(&mut self, item: &str, verificado: bool) -> bool {
        match self.items.get_mut(item) {
            Some(v) => {
                *v = verificado;
                true
            }
            None => false,
        }
    }
}

/// Immutable record of one signing event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FirmaDigital {
    imagen_base64: String,
    nombre_firmante: String,
    identificacion_firmante: String,
    capturada_en: DateTime<Utc>,
    direccion_ip: Option<String>,
    agente_usuario: Option<String>,
}

impl FirmaDigital {
    /// Validating constructor; the capture timestamp is server-assigned.
    ///
    /// The image must be an image data-URI whose base64 body decodes.
    pub fn new(
        imagen_base64: impl Into<String>,
        nombre_firmante: impl Into<String>,
        identificacion_firmante: impl Into<String>,
        direccion_ip: Option<String>,
        agente_usuario: Option<String>,
    ) -> DomainResult<Self> {
        let imagen_base64 = imagen_base64.into();
        if !imagen_base64.starts_with("data:image/") {
            return Err(DomainError::validation(
                "firma.imagen_base64",
                "must be an image data-URI (data:image/...)",
            ));
        }
        let cuerpo = imagen_base64
            .split_once(";base64,")
            .map(|(_, body)| body)
            .ok_or_else(|| {
                DomainError::validation("firma.imagen_base64", "missing `;base64,` marker")
            })?;
        if cuerpo.is_empty() || BASE64.decode(cuerpo).is_err() {
            return Err(DomainError::validation(
                "firma.imagen_base64",
                "payload is not valid base64",
            ));
        }

        let nombre_firmante = nombre_firmante.into();
        if nombre_firmante.trim().chars().count() < 2 {
            return Err(DomainError::validation(
                "firma.nombre_firmante",
                "must be at least 2 characters",
            ));
        }
        let identificacion_firmante = identificacion_firmante.into();
        if identificacion_firmante.trim().is_empty() {
            return Err(DomainError::validation(
                "firma.identificacion_firmante",
                "must not be empty",
            ));
        }

        Ok(Self {
            imagen_base64,
            nombre_firmante,
            identificacion_firmante,
            capturada_en: Utc::now(),
            direccion_ip,
            agente_usuario,
        })
    }

    /// The signature image as an image data-URI
    pub fn imagen_base64(&self) -> &str {
        &self.imagen_base64
    }

    /// Who signed
    pub fn nombre_firmante(&self) -> &str {
        &self.nombre_firmante
    }

    /// Signer's identity number
    pub fn identificacion_firmante(&self) -> &str {
        &self.identificacion_firmante
    }

    /// Server-assigned capture time
    pub fn capturada_en(&self) -> DateTime<Utc> {
        self.capturada_en
    }

    /// Requesting IP, when captured over the wire
    pub fn direccion_ip(&self) -> Option<&str> {
        self.direccion_ip.as_deref()
    }

    /// Requesting user agent, when captured over the wire
    pub fn agente_usuario(&self) -> Option<&str> {
        self.agente_usuario.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG, enough to exercise the base64 path
    const FIRMA_VALIDA: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn checklist(pairs: &[(&str, bool)]) -> IndexMap<String, bool> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    /// Valid client info passes, accessors reflect inputs
    #[test]
    fn test_cliente_info_valid() {
        let cliente = ClienteInfo::new(
            "Acme Ltda",
            "900123456-7",
            Some("+57 300 000 0000".to_string()),
            Some("ops@acme.co".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(cliente.nombre(), "Acme Ltda");
        assert_eq!(cliente.identificacion(), "900123456-7");
        assert_eq!(cliente.email(), Some("ops@acme.co"));
        assert_eq!(cliente.direccion(), None);
    }

    /// Client info rejects short names, empty ids and bad emails
    #[test]
    fn test_cliente_info_rejections() {
        let err = ClienteInfo::new("A", "900", None, None, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "cliente.nombre"
        ));

        let err = ClienteInfo::new("Acme", "  ", None, None, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "cliente.identificacion"
        ));

        let err =
            ClienteInfo::new("Acme", "900", None, Some("not-an-email".to_string()), None)
                .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "cliente.email"
        ));
    }

    /// Entry conditions validate description and photo references
    #[test]
    fn test_condiciones_entrada() {
        let condiciones =
            CondicionesEntrada::new("Panel exterior oxidado", true, vec!["foto-1.jpg".into()])
                .unwrap();
        assert!(condiciones.tiene_danos_visibles());
        assert!(condiciones.tiene_fotografias());

        assert!(CondicionesEntrada::new("  ", false, vec![]).is_err());
        assert!(CondicionesEntrada::new("ok", false, vec!["".into()]).is_err());

        let sin_fotos = CondicionesEntrada::new("Sitio despejado", false, vec![]).unwrap();
        assert!(!sin_fotos.tiene_fotografias());
    }

    /// Diagnosis requires a minimum description and parts when flagged
    #[test]
    fn test_diagnostico_preliminar() {
        let diagnostico = DiagnosticoPreliminar::new(
            "Compresor presenta fuga de refrigerante",
            Some("Reemplazar sello".to_string()),
            true,
            Some("Sello R-410A".to_string()),
        )
        .unwrap();
        assert!(diagnostico.requiere_repuestos());

        // Too short
        assert!(DiagnosticoPreliminar::new("corto", None, false, None).is_err());

        // Parts flagged but not listed
        let err = DiagnosticoPreliminar::new(
            "Compresor presenta fuga de refrigerante",
            None,
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "diagnostico.repuestos_estimados"
        ));
    }

    /// Checklist percentage and completion flag
    ///
    /// ```mermaid
    /// graph LR
    ///     A[4 items, 3 checked] -->|porcentaje_completado| B[75.0]
    ///     A -->|marcar last| C[100.0]
    /// ```
    #[test]
    fn test_requerimientos_seguridad_percentage() {
        let mut seguridad = RequerimientosSeguridad::new(
            checklist(&[
                ("epp", true),
                ("bloqueo_electrico", true),
                ("ventilacion", true),
                ("permiso_trabajo", false),
            ]),
            false,
        )
        .unwrap();

        assert_eq!(seguridad.porcentaje_completado(), 75.0);
        assert!(!seguridad.esta_completo());

        assert!(seguridad.marcar("permiso_trabajo", true));
        assert_eq!(seguridad.porcentaje_completado(), 100.0);
        assert!(seguridad.esta_completo());

        // Unknown items are reported, not silently added
        assert!(!seguridad.marcar("arnes", true));
        assert_eq!(seguridad.items().len(), 4);
    }

    /// Empty checklists and blank item names are invalid
    #[test]
    fn test_requerimientos_seguridad_rejections() {
        assert!(RequerimientosSeguridad::new(IndexMap::new(), false).is_err());
        assert!(RequerimientosSeguridad::new(checklist(&[(" ", true)]), false).is_err());
    }

    /// A valid signature records identity and a server-side timestamp
    #[test]
    fn test_firma_digital_valid() {
        let antes = Utc::now();
        let firma = FirmaDigital::new(
            FIRMA_VALIDA,
            "Maria Gomez",
            "CC 1020301234",
            Some("10.0.0.5".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(firma.nombre_firmante(), "Maria Gomez");
        assert!(firma.capturada_en() >= antes);
        assert_eq!(firma.direccion_ip(), Some("10.0.0.5"));
    }

    /// Signature image validation: prefix, marker, and decodability
    #[test]
    fn test_firma_digital_image_rejections() {
        // Not a data-URI
        assert!(FirmaDigital::new("iVBORw0KGgo=", "Maria", "CC 1", None, None).is_err());
        // Wrong media type
        assert!(
            FirmaDigital::new("data:text/plain;base64,aGVsbG8=", "Maria", "CC 1", None, None)
                .is_err()
        );
        // Missing base64 marker
        assert!(FirmaDigital::new("data:image/png,rawbytes", "Maria", "CC 1", None, None).is_err());
        // Body is not base64
        assert!(
            FirmaDigital::new("data:image/png;base64,!!not-base64!!", "Maria", "CC 1", None, None)
                .is_err()
        );
        // Empty body
        assert!(FirmaDigital::new("data:image/png;base64,", "Maria", "CC 1", None, None).is_err());
    }

    /// Signer fields are validated
    #[test]
    fn test_firma_digital_signer_rejections() {
        let err = FirmaDigital::new(FIRMA_VALIDA, "M", "CC 1", None, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "firma.nombre_firmante"
        ));

        let err = FirmaDigital::new(FIRMA_VALIDA, "Maria", "  ", None, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { ref field, .. } if field == "firma.identificacion_firmante"
        ));
    }

    /// Hydration via serde trusts stored data (no re-validation)
    #[test]
    fn test_hydration_trusts_persisted_data() {
        // A historical record with a one-character name would fail `new`,
        // but must still load from storage.
        let json = r#"{
            "imagen_base64": "data:image/png;base64,AA==",
            "nombre_firmante": "X",
            "identificacion_firmante": "CC 9",
            "capturada_en": "2020-01-01T00:00:00Z",
            "direccion_ip": null,
            "agente_usuario": null
        }"#;
        let firma: FirmaDigital = serde_json::from_str(json).unwrap();
        assert_eq!(firma.nombre_firmante(), "X");
    }
}
