//! Structures de l'enveloppe SOAP

use crate::fault::Fault;

/// Namespace de l'enveloppe SOAP 1.1
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace de l'enveloppe SOAP 1.2, accepté en réponse
pub const SOAP12_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Enveloppe SOAP complète
///
/// Construite à chaque appel : en sortie elle entoure le payload de la
/// requête, en entrée elle reçoit soit le payload de réponse, soit un [`Fault`].
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<P> {
    /// Corps SOAP
    pub body: Body<P>,
}

/// Corps SOAP
///
/// Contient un payload ou un fault. Quand la réponse porte un fault,
/// `content` reste vide et le fault l'emporte.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<P> {
    pub content: Option<P>,
    pub fault: Option<Fault>,
}

impl<P> Envelope<P> {
    /// Crée une enveloppe sortante autour d'un payload
    pub fn new(content: P) -> Self {
        Self {
            body: Body {
                content: Some(content),
                fault: None,
            },
        }
    }

    /// Enveloppe dont le corps ne contient rien
    pub fn empty() -> Self {
        Self {
            body: Body {
                content: None,
                fault: None,
            },
        }
    }

    /// Enveloppe portant un fault
    pub fn from_fault(fault: Fault) -> Self {
        Self {
            body: Body {
                content: None,
                fault: Some(fault),
            },
        }
    }

    pub fn is_fault(&self) -> bool {
        self.body.fault.is_some()
    }

    /// Résultat de l'enveloppe : le fault s'il y en a un, sinon le payload
    pub fn into_result(self) -> Result<Option<P>, Fault> {
        match self.body.fault {
            Some(fault) => Err(fault),
            None => Ok(self.body.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_envelope_has_no_fault() {
        let envelope = Envelope::new("payload");
        assert!(!envelope.is_fault());
        assert_eq!(envelope.into_result(), Ok(Some("payload")));
    }

    #[test]
    fn test_fault_takes_precedence() {
        let mut envelope = Envelope::new(42u32);
        envelope.body.fault = Some(Fault::new("soap:Server", "down"));

        assert!(envelope.is_fault());
        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.fault_string, "down");
    }

    #[test]
    fn test_empty_envelope() {
        let envelope: Envelope<u32> = Envelope::empty();
        assert_eq!(envelope.into_result(), Ok(None));
    }
}
