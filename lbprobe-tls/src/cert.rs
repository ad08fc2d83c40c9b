//! Certificate encoding and subject inspection.

use lbprobe_core::error::{BoxError, OpaqueError};
use rustls_pki_types::{CertificateDer, pem::PemObject};
use std::fmt;
use x509_parser::{
    nom,
    oid_registry::{
        OID_X509_COMMON_NAME, OID_X509_COUNTRY_NAME, OID_X509_LOCALITY_NAME,
        OID_X509_ORGANIZATION_NAME, OID_X509_ORGANIZATIONAL_UNIT, OID_X509_STATE_OR_PROVINCE_NAME,
    },
    x509::AttributeTypeAndValue,
};

const PEM_TAG: &str = "CERTIFICATE";

const OID_EMAIL_ADDRESS: &str = "1.2.840.113549.1.9.1";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A single certificate, PEM encoded.
pub struct PemCertificate(String);

impl PemCertificate {
    /// The PEM text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the certificate into its PEM text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode this certificate back into DER.
    pub fn to_der(&self) -> Result<Vec<u8>, CertificateParseError> {
        pem_to_der(&self.0)
    }

    /// Extract the subject of this certificate.
    pub fn subject(&self) -> Result<CertificateSubject, CertificateParseError> {
        extract_subject(&self.0)
    }
}

impl fmt::Display for PemCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PemCertificate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode a DER certificate as PEM, with `\n` line endings.
#[must_use]
pub fn der_to_pem(der: &[u8]) -> PemCertificate {
    PemCertificate(pem::encode_config(
        &pem::Pem::new(PEM_TAG, der),
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    ))
}

/// Decode the first certificate found in the given PEM text into DER.
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>, CertificateParseError> {
    let der = CertificateDer::from_pem_slice(pem.as_bytes())
        .map_err(|err| CertificateParseError::new(CertificateParseErrorKind::Pem, err))?;
    Ok(der.as_ref().to_vec())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The subject of a certificate.
///
/// Only the first occurrence of each well known attribute is kept.
/// Attributes which are not known end up in [`CertificateSubject::unknown`].
pub struct CertificateSubject {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub locality: Option<String>,
    pub email_address: Option<String>,
    pub unknown: Vec<UnknownAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A subject attribute that is not mapped onto a [`CertificateSubject`] field.
pub struct UnknownAttribute {
    /// Dotted representation of the attribute type (e.g. `2.5.4.5`).
    pub oid: String,
    pub value: String,
}

impl CertificateSubject {
    fn insert(&mut self, attr: &AttributeTypeAndValue<'_>) {
        let oid = attr.attr_type();
        let slot = if *oid == OID_X509_COMMON_NAME {
            &mut self.common_name
        } else if *oid == OID_X509_ORGANIZATION_NAME {
            &mut self.organization
        } else if *oid == OID_X509_ORGANIZATIONAL_UNIT {
            &mut self.organizational_unit
        } else if *oid == OID_X509_COUNTRY_NAME {
            &mut self.country
        } else if *oid == OID_X509_STATE_OR_PROVINCE_NAME {
            &mut self.state_or_province
        } else if *oid == OID_X509_LOCALITY_NAME {
            &mut self.locality
        } else if oid.to_id_string() == OID_EMAIL_ADDRESS {
            &mut self.email_address
        } else {
            self.unknown.push(UnknownAttribute {
                oid: oid.to_id_string(),
                value: attribute_value(attr),
            });
            return;
        };
        if slot.is_none() {
            *slot = Some(attribute_value(attr));
        }
    }
}

fn attribute_value(attr: &AttributeTypeAndValue<'_>) -> String {
    match attr.as_str() {
        Ok(value) => value.to_owned(),
        Err(_) => String::from_utf8_lossy(attr.as_slice()).into_owned(),
    }
}

impl fmt::Display for CertificateSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = [
            ("CN", &self.common_name),
            ("OU", &self.organizational_unit),
            ("O", &self.organization),
            ("L", &self.locality),
            ("ST", &self.state_or_province),
            ("C", &self.country),
            ("emailAddress", &self.email_address),
        ];
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| {
            if std::mem::take(&mut first) {
                Ok(())
            } else {
                f.write_str(", ")
            }
        };
        for (key, value) in known {
            if let Some(value) = value {
                sep(f)?;
                write!(f, "{key}={value}")?;
            }
        }
        for attr in &self.unknown {
            sep(f)?;
            write!(f, "{}={}", attr.oid, attr.value)?;
        }
        Ok(())
    }
}

/// Extract the subject of the certificate found in the given PEM text.
pub fn extract_subject(pem: &str) -> Result<CertificateSubject, CertificateParseError> {
    let der = pem_to_der(pem)?;
    let (rest, cert) = x509_parser::parse_x509_certificate(&der).map_err(|err| match err {
        nom::Err::Error(err) | nom::Err::Failure(err) => {
            CertificateParseError::new(CertificateParseErrorKind::Der, err)
        }
        nom::Err::Incomplete(_) => CertificateParseError::new(
            CertificateParseErrorKind::Der,
            OpaqueError::from_display("incomplete DER certificate"),
        ),
    })?;
    if !rest.is_empty() {
        return Err(CertificateParseError::new(
            CertificateParseErrorKind::TrailingData,
            OpaqueError::from_display(format!(
                "{} byte(s) of trailing data after certificate",
                rest.len()
            )),
        ));
    }

    let mut subject = CertificateSubject::default();
    for attr in cert.subject().iter_attributes() {
        subject.insert(attr);
    }
    Ok(subject)
}

/// The kind of [`CertificateParseError`] that can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateParseErrorKind {
    /// The input is not valid PEM, or contains no certificate.
    Pem,
    /// The certificate is not valid DER encoded X.509.
    Der,
    /// The certificate is followed by unexpected bytes.
    TrailingData,
}

impl fmt::Display for CertificateParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pem => write!(f, "Pem"),
            Self::Der => write!(f, "Der"),
            Self::TrailingData => write!(f, "TrailingData"),
        }
    }
}

/// Error returned when a certificate could not be decoded or parsed.
#[derive(Debug)]
pub struct CertificateParseError {
    kind: CertificateParseErrorKind,
    source: BoxError,
}

impl CertificateParseError {
    /// Create a new [`CertificateParseError`] with the given kind and source.
    pub fn new(kind: CertificateParseErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Get the kind of error that occurred.
    #[must_use]
    pub fn kind(&self) -> CertificateParseErrorKind {
        self.kind
    }
}

impl fmt::Display for CertificateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "certificate parse error ({}): {}", self.kind, self.source)
    }
}

impl std::error::Error for CertificateParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}
