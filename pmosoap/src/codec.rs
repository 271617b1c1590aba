//! Marshalling of SOAP envelopes to and from XML bytes
//!
//! [`XmlCodec`] is the contract the client relies on. [`QuickXmlCodec`] is
//! the default implementation: payloads go through `quick-xml`'s serde
//! support, the envelope structure is read with `xmltree`.

use crate::envelope::{Envelope, SOAP_ENV_NS};
use crate::error::{Result, SoapError};
use crate::fault::Fault;
use quick_xml::escape::escape;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use xmltree::{Element, EmitterConfig, XMLNode};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serialization strategy for SOAP envelopes
///
/// Implementations must:
/// - `marshal`: write a well-formed document whose root is a namespaced
///   `Envelope` containing one `Body` that holds the payload (or the fault).
///   Payloads that cannot be written fail with [`SoapError::Serialization`].
/// - `unmarshal`: fill either `body.content` or `body.fault`. A fault takes
///   precedence over any payload. Malformed XML or a missing
///   `Envelope`/`Body` fails with [`SoapError::Deserialization`].
pub trait XmlCodec: Send + Sync {
    fn marshal<P: Serialize>(&self, envelope: &Envelope<P>) -> Result<Vec<u8>>;

    fn unmarshal<R: DeserializeOwned>(&self, xml: &[u8]) -> Result<Envelope<R>>;
}

impl<C: XmlCodec> XmlCodec for Arc<C> {
    fn marshal<P: Serialize>(&self, envelope: &Envelope<P>) -> Result<Vec<u8>> {
        (**self).marshal(envelope)
    }

    fn unmarshal<R: DeserializeOwned>(&self, xml: &[u8]) -> Result<Envelope<R>> {
        (**self).unmarshal(xml)
    }
}

/// Default codec backed by `quick-xml` and `xmltree`
#[derive(Debug, Clone)]
pub struct QuickXmlCodec {
    prefix: String,
    declaration: bool,
}

impl Default for QuickXmlCodec {
    fn default() -> Self {
        Self {
            prefix: "soap".to_string(),
            declaration: true,
        }
    }
}

impl QuickXmlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace prefix used for `Envelope` and `Body` (empty means default namespace)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether to emit the `<?xml ...?>` declaration
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    fn qualified(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }

    fn namespace_attribute(&self) -> String {
        if self.prefix.is_empty() {
            format!(r#"xmlns="{SOAP_ENV_NS}""#)
        } else {
            format!(r#"xmlns:{}="{SOAP_ENV_NS}""#, self.prefix)
        }
    }

    fn fault_xml(&self, fault: &Fault) -> String {
        let mut xml = format!(
            "<{tag}><faultcode>{}</faultcode><faultstring>{}</faultstring>",
            escape(fault.fault_code.as_str()),
            escape(fault.fault_string.as_str()),
            tag = self.qualified("Fault"),
        );
        if let Some(actor) = &fault.fault_actor {
            xml.push_str(&format!("<faultactor>{}</faultactor>", escape(actor.as_str())));
        }
        if let Some(detail) = &fault.detail {
            // detail is already XML
            xml.push_str(&format!("<detail>{detail}</detail>"));
        }
        xml.push_str(&format!("</{}>", self.qualified("Fault")));
        xml
    }
}

impl XmlCodec for QuickXmlCodec {
    fn marshal<P: Serialize>(&self, envelope: &Envelope<P>) -> Result<Vec<u8>> {
        let inner = match (&envelope.body.fault, &envelope.body.content) {
            (Some(fault), _) => self.fault_xml(fault),
            (None, Some(content)) => {
                quick_xml::se::to_string(content).map_err(SoapError::serialization)?
            }
            (None, None) => String::new(),
        };

        let envelope_tag = self.qualified("Envelope");
        let body_tag = self.qualified("Body");

        let mut xml = String::with_capacity(inner.len() + 192);
        if self.declaration {
            xml.push_str(XML_DECLARATION);
        }
        xml.push_str(&format!(
            "<{envelope_tag} {}><{body_tag}>",
            self.namespace_attribute()
        ));
        xml.push_str(&inner);
        xml.push_str(&format!("</{body_tag}></{envelope_tag}>"));

        Ok(xml.into_bytes())
    }

    fn unmarshal<R: DeserializeOwned>(&self, xml: &[u8]) -> Result<Envelope<R>> {
        let root = Element::parse(xml).map_err(SoapError::deserialization)?;

        if local_name(&root.name) != "Envelope" {
            return Err(SoapError::deserialization(format!(
                "expected a SOAP Envelope, found <{}>",
                root.name
            )));
        }

        let body = child_element(&root, "Body")
            .ok_or_else(|| SoapError::deserialization("missing SOAP Body"))?;

        if let Some(fault) = child_element(body, "Fault") {
            return Ok(Envelope::from_fault(parse_fault(fault)?));
        }

        let Some(payload) = body.children.iter().find_map(XMLNode::as_element) else {
            return Ok(Envelope::empty());
        };

        let payload_xml = write_element(payload)?;
        let content = quick_xml::de::from_str(&payload_xml).map_err(|e| {
            SoapError::deserialization(format!("invalid <{}> payload: {e}", payload.name))
        })?;

        Ok(Envelope::new(content))
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn child_element<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    child_element(parent, name)
        .and_then(|elem| elem.get_text())
        .map(|text| text.trim().to_string())
}

/// Read a SOAP 1.1 fault, falling back on the SOAP 1.2 element names
fn parse_fault(elem: &Element) -> Result<Fault> {
    let fault_code = child_text(elem, "faultcode")
        .or_else(|| child_element(elem, "Code").and_then(|code| child_text(code, "Value")))
        .unwrap_or_default();

    let fault_string = child_text(elem, "faultstring")
        .or_else(|| child_element(elem, "Reason").and_then(|reason| child_text(reason, "Text")))
        .unwrap_or_default();

    let fault_actor = child_text(elem, "faultactor").or_else(|| child_text(elem, "Role"));

    let detail = match child_element(elem, "detail").or_else(|| child_element(elem, "Detail")) {
        Some(detail) => Some(inner_xml(detail)?),
        None => None,
    };

    Ok(Fault {
        fault_code,
        fault_string,
        fault_actor,
        detail,
    })
}

fn write_element(elem: &Element) -> Result<String> {
    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(false)
        .perform_indent(false);
    elem.write_with_config(&mut buf, config)
        .map_err(SoapError::deserialization)?;
    String::from_utf8(buf).map_err(SoapError::deserialization)
}

fn inner_xml(elem: &Element) -> Result<String> {
    let mut xml = String::new();
    for node in &elem.children {
        match node {
            XMLNode::Element(child) => xml.push_str(&write_element(child)?),
            XMLNode::Text(text) => xml.push_str(&escape(text.as_str())),
            XMLNode::CData(data) => xml.push_str(&format!("<![CDATA[{data}]]>")),
            _ => {}
        }
    }
    Ok(xml.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fault::FaultCode;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename = "GetPrice")]
    struct GetPrice {
        #[serde(rename = "Item")]
        item: String,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct GetPriceResponse {
        #[serde(rename = "Price")]
        price: f64,
    }

    fn decode(xml: &str) -> Result<Envelope<GetPriceResponse>> {
        QuickXmlCodec::new().unmarshal(xml.as_bytes())
    }

    #[test]
    fn test_marshal_wraps_payload() {
        let xml = QuickXmlCodec::new()
            .marshal(&Envelope::new(GetPrice {
                item: "Apples".to_string(),
            }))
            .unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#));
        assert!(xml.contains("<soap:Body><GetPrice><Item>Apples</Item></GetPrice></soap:Body>"));
        assert!(xml.ends_with("</soap:Envelope>"));
    }

    #[test]
    fn test_marshal_escapes_text() {
        let xml = QuickXmlCodec::new()
            .marshal(&Envelope::new(GetPrice {
                item: "Fish & <Chips>".to_string(),
            }))
            .unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn test_marshal_custom_prefix_without_declaration() {
        let codec = QuickXmlCodec::new().with_prefix("s").with_declaration(false);
        let xml = codec
            .marshal(&Envelope::new(GetPrice {
                item: "Pears".to_string(),
            }))
            .unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.starts_with(r#"<s:Envelope xmlns:s="#));
        assert!(xml.contains("<s:Body>"));
    }

    #[test]
    fn test_marshal_default_namespace() {
        let codec = QuickXmlCodec::new().with_prefix("");
        let xml = codec.marshal(&Envelope::<GetPrice>::empty()).unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.contains(r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/"><Body></Body></Envelope>"#));
    }

    #[test]
    fn test_unmarshal_prefixed_payload() {
        let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <m:GetPriceResponse xmlns:m="https://www.example.org/stock">
      <m:Price>34.5</m:Price>
    </m:GetPriceResponse>
  </soap:Body>
</soap:Envelope>"#;

        let envelope = decode(xml).unwrap();
        assert!(envelope.body.fault.is_none());
        assert_eq!(
            envelope.body.content,
            Some(GetPriceResponse { price: 34.5 })
        );
    }

    #[test]
    fn test_unmarshal_soap11_fault() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>Invalid request</faultstring>
      <faultactor>urn:gateway</faultactor>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>401</errorCode>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

        let envelope = decode(xml).unwrap();
        assert!(envelope.body.content.is_none());

        let fault = envelope.body.fault.unwrap();
        assert_eq!(fault.fault_code, "s:Client");
        assert_eq!(fault.code(), FaultCode::Client);
        assert_eq!(fault.fault_string, "Invalid request");
        assert_eq!(fault.fault_actor.as_deref(), Some("urn:gateway"));
        let detail = fault.detail.unwrap();
        assert!(detail.contains("UPnPError"));
        assert!(detail.contains("401"));
    }

    #[test]
    fn test_unmarshal_soap12_fault() {
        let xml = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code><env:Value>env:Receiver</env:Value></env:Code>
      <env:Reason><env:Text xml:lang="en">Database down</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

        let fault = decode(xml).unwrap().body.fault.unwrap();
        assert_eq!(fault.code(), FaultCode::Server);
        assert_eq!(fault.fault_string, "Database down");
        assert!(fault.detail.is_none());
    }

    #[test]
    fn test_fault_wins_over_payload() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<GetPriceResponse><Price>1</Price></GetPriceResponse>
<soap:Fault><faultcode>soap:Server</faultcode><faultstring>late failure</faultstring></soap:Fault>
</soap:Body></soap:Envelope>"#;

        let envelope = decode(xml).unwrap();
        assert!(envelope.body.content.is_none());
        assert_eq!(envelope.body.fault.unwrap().fault_string, "late failure");
    }

    #[test]
    fn test_unmarshal_empty_body() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body/></soap:Envelope>"#;

        let envelope = decode(xml).unwrap();
        assert!(envelope.body.content.is_none());
        assert!(envelope.body.fault.is_none());
    }

    #[test]
    fn test_unmarshal_rejects_non_envelope() {
        let err = decode("<GetPriceResponse><Price>1</Price></GetPriceResponse>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_unmarshal_rejects_missing_body() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Header/></soap:Envelope>"#;
        let err = decode(xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert!(err.to_string().contains("Body"));
    }

    #[test]
    fn test_unmarshal_rejects_garbage() {
        let err = decode("this is not xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_unmarshal_rejects_mismatched_payload() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<GetPriceResponse><Price>not a number</Price></GetPriceResponse>
</soap:Body></soap:Envelope>"#;

        let err = decode(xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_fault_marshal_roundtrip() {
        let codec = QuickXmlCodec::new();
        let fault = Fault::new("soap:Client", "Bad <input>")
            .with_actor("urn:edge")
            .with_detail("<code>42</code>");

        let xml = codec
            .marshal(&Envelope::<GetPrice>::from_fault(fault.clone()))
            .unwrap();
        let decoded = codec
            .unmarshal::<GetPrice>(&xml)
            .unwrap()
            .body
            .fault
            .unwrap();

        assert_eq!(decoded.fault_code, fault.fault_code);
        assert_eq!(decoded.fault_string, "Bad <input>");
        assert_eq!(decoded.fault_actor, fault.fault_actor);
        // in-scope namespace bindings may be re-declared on detail children
        assert!(decoded.detail.unwrap().contains(">42</code>"));
    }
}
