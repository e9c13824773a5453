//! Parsing the `eparcel` rate response.
//!
//! The document is read into an element tree and every field is looked up by path: the
//! first matching element wins and a missing one reads as empty. The text is converted into
//! the domain types with the helpers in [`crate::lenient`]. Only a body that is not an XML
//! document is an error at this stage.

use crate::{
    lenient::{parse_money, parse_or_default, parse_timestamp},
    status,
    xml::Element,
    BusinessHours, CanadaPostError, Location, PackedItem, PackingBox, PostalOutlet, RateEstimate,
    RateResponse, ResponseError, CARRIER_NAME,
};

/// Parse a raw rate response.
///
/// Returns a [`ResponseError`] holding the parsed response when the status code is not a
/// success, and [`CanadaPostError::Xml`] when the body cannot be read as XML.
pub fn parse_rate_response(xml: &str) -> Result<RateResponse, CanadaPostError> {
    let root = Element::parse(xml)?;

    // A rejected request gets an `error` block instead of `ratesAndServicesResponse`.
    let body = root.child("ratesAndServicesResponse");
    let header = body.or_else(|| root.child("error"));
    let field = |name: &str| {
        header
            .map(|h| h.text_of(name).to_string())
            .unwrap_or_default()
    };

    let status_code = field("statusCode");
    let success = status::is_success(&status_code);

    let mut response = RateResponse {
        success,
        message: field("statusMessage"),
        status_code,
        request_id: field("requestID"),
        xml: xml.to_string(),
        params: root.to_json(),
        ..Default::default()
    };

    if !success {
        log::warn!(
            "Canada Post status {}: {}",
            response.status_code,
            response.message
        );
        return Err(ResponseError::new(response).into());
    }
    if response.is_degraded() {
        log::warn!(
            "Canada Post returned default rates: {}",
            response.message
        );
    }

    if let Some(body) = body {
        response.rates = body.children("product").map(rate_estimate).collect();
        response.boxes = body
            .children("packing")
            .flat_map(|packing| packing.children("box"))
            .map(packing_box)
            .collect();
        response.postal_outlets = body
            .children("nearestPostalOutlet")
            .map(postal_outlet)
            .collect();
    }

    log::debug!(
        "parsed {} rates, {} boxes, {} postal outlets",
        response.rates.len(),
        response.boxes.len(),
        response.postal_outlets.len()
    );

    Ok(response)
}

fn rate_estimate(product: &Element) -> RateEstimate {
    RateEstimate {
        carrier: CARRIER_NAME.to_string(),
        service_name: product.text_of("name").to_string(),
        service_code: product.attribute("id").to_string(),
        total_price: parse_money("rate", product.text_of("rate")),
        shipping_date: parse_timestamp("shippingDate", product.text_of("shippingDate")),
        delivery_date: parse_timestamp("deliveryDate", product.text_of("deliveryDate")),
        packing_id: product.text_of("packingID").to_string(),
    }
}

fn packing_box(element: &Element) -> PackingBox {
    PackingBox {
        name: element.text_of("name").to_string(),
        weight: parse_or_default("weight", element.text_of("weight")),
        expediter_weight: parse_or_default("expediterWeight", element.text_of("expediterWeight")),
        length: parse_or_default("length", element.text_of("length")),
        width: parse_or_default("width", element.text_of("width")),
        height: parse_or_default("height", element.text_of("height")),
        packed_items: element
            .children("packedItem")
            .map(|item| PackedItem {
                quantity: parse_or_default("quantity", item.text_of("quantity")),
                description: item.text_of("description").to_string(),
            })
            .collect(),
    }
}

fn postal_outlet(outlet: &Element) -> PostalOutlet {
    PostalOutlet {
        sequence_no: outlet.text_of("postalOutletSequenceNo").to_string(),
        distance: outlet.text_of("distance").to_string(),
        name: outlet.text_of("outletName").to_string(),
        business_name: outlet.text_of("businessName").to_string(),
        postal_address: Location {
            address1: outlet.text_of("postalAddress/addressLine").to_string(),
            city: outlet.text_of("postalAddress/municipality").to_string(),
            province: outlet.text_of("postalAddress/province").to_string(),
            country: "Canada".to_string(),
            postal_code: outlet.text_of("postalAddress/postal_code").to_string(),
            phone_number: outlet.text_of("phoneNumber").to_string(),
        },
        business_hours: outlet
            .children("businessHours")
            .map(|hours| BusinessHours {
                day_of_week: hours.text_of("dayOfWeek").to_string(),
                time: hours.text_of("time").to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" ?>
<!DOCTYPE eparcel SYSTEM "http://sellonline.canadapost.ca/DevelopersResources/protocolV3/eParcel.dtd">
<eparcel>
  <ratesAndServicesResponse>
    {}
  </ratesAndServicesResponse>
</eparcel>"#,
            body
        )
    }

    #[test]
    fn test_single_product() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusMessage>OK</statusMessage>
    <product id="1020" sequence="1">
      <name>Expedited</name>
      <rate>12.34</rate>
      <deliveryDate>2024-01-05</deliveryDate>
    </product>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert!(response.success);
        assert!(!response.is_degraded());
        assert_eq!(response.message, "OK");
        assert_eq!(response.status_code, "1");
        assert_eq!(response.xml, xml);
        assert_eq!(
            response.rates,
            vec![RateEstimate {
                carrier: "Canada Post".to_string(),
                service_name: "Expedited".to_string(),
                service_code: "1020".to_string(),
                total_price: dec!(12.34),
                shipping_date: None,
                delivery_date: Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()),
                packing_id: String::new(),
            }]
        );
        assert!(response.boxes.is_empty());
        assert!(response.postal_outlets.is_empty());
        assert_eq!(
            response.params["ratesAndServicesResponse"]["statusCode"],
            serde_json::json!("1")
        );
    }

    #[test]
    fn test_default_rates_count_as_success() {
        let xml = wrap(
            r#"<statusCode>2</statusCode>
    <statusMessage>Default rates</statusMessage>
    <product id="1040"><name>Priority Courier</name><rate>40.28</rate></product>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert!(response.success);
        assert!(response.is_degraded());
        assert_eq!(response.rates.len(), 1);
        assert_eq!(response.rates[0].total_price, dec!(40.28));
    }

    #[test]
    fn test_failure_status() {
        let xml = wrap(
            r#"<statusCode>-2001</statusCode>
    <statusMessage>Merchant Id not found on server</statusMessage>
    <product id="1040"><name>Priority Courier</name><rate>40.28</rate></product>
    <packing>
      <packingID>P_0</packingID>
      <box>
        <name>Small Box</name>
        <weight>1.691</weight>
        <packedItem><quantity>1</quantity><description>Widgets</description></packedItem>
      </box>
    </packing>
    <nearestPostalOutlet>
      <postalOutletSequenceNo>1</postalOutletSequenceNo>
      <outletName>BYWARD PO</outletName>
      <businessHours><dayOfWeek>1</dayOfWeek><time>10:00-17:00</time></businessHours>
    </nearestPostalOutlet>"#,
        );

        match parse_rate_response(&xml) {
            Err(CanadaPostError::Response(err)) => {
                assert_eq!(err.code, "-2001");
                assert_eq!(err.message, "Merchant Id not found on server");
                assert!(!err.response.success);
                assert!(err.response.rates.is_empty());
                assert!(err.response.boxes.is_empty());
                assert!(err.response.postal_outlets.is_empty());
            }
            other => panic!("expected a response error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope() {
        let xml = r#"<?xml version="1.0" ?>
<eparcel>
  <error>
    <statusCode>-5000</statusCode>
    <statusMessage>XML Parsing error</statusMessage>
  </error>
</eparcel>"#;

        match parse_rate_response(xml) {
            Err(CanadaPostError::Response(err)) => {
                assert_eq!(err.code, "-5000");
                assert_eq!(err.message, "XML Parsing error");
                assert_eq!(err.description(), Some("XML Parsing error"));
            }
            other => panic!("expected a response error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_status_is_a_failure() {
        let err = parse_rate_response("<eparcel></eparcel>").unwrap_err();
        assert!(matches!(err, CanadaPostError::Response(_)));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_rate_response("<eparcel><ratesAndServicesResponse></eparcel>").unwrap_err();
        assert!(matches!(err, CanadaPostError::Xml(_)), "{:?}", err);

        let err = parse_rate_response("<eparcel><ratesAndServicesResponse><statusCode>1</statusCode>")
            .unwrap_err();
        assert!(matches!(err, CanadaPostError::Xml(_)), "{:?}", err);
    }

    #[test]
    fn test_nested_elements_in_leaves() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusMessage>OK</statusMessage>
    <product id="1010">
      <name>A <b>bold</b></name>
      <rate>9.59</rate>
      <deliveryDate><day>5</day></deliveryDate>
    </product>
    <nearestPostalOutlet>
      <outletName>BYWARD <i>PO</i></outletName>
      <postalAddress><municipality>OTTAWA</municipality></postalAddress>
    </nearestPostalOutlet>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert_eq!(response.rates.len(), 1);
        assert_eq!(response.rates[0].service_name, "A");
        assert_eq!(response.rates[0].total_price, dec!(9.59));
        assert_eq!(response.rates[0].delivery_date, None);
        assert_eq!(response.postal_outlets[0].name, "BYWARD");
        assert_eq!(response.postal_outlets[0].postal_address.city, "OTTAWA");
    }

    #[test]
    fn test_repeated_leaves_use_the_first() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusCode>-2001</statusCode>
    <statusMessage>OK</statusMessage>
    <product id="1010">
      <name>Regular</name>
      <rate>1.00</rate>
      <rate>2.00</rate>
    </product>
    <nearestPostalOutlet>
      <postalAddress>
        <addressLine>71 RIDEAU ST</addressLine>
        <addressLine>SUITE 2</addressLine>
      </postalAddress>
    </nearestPostalOutlet>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert!(response.success);
        assert_eq!(response.status_code, "1");
        assert_eq!(response.rates[0].total_price, dec!(1.00));
        assert_eq!(response.postal_outlets[0].postal_address.address1, "71 RIDEAU ST");
    }

    #[test]
    fn test_garbled_fields_use_defaults() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusMessage>OK</statusMessage>
    <product id="1010">
      <name>Regular</name>
      <rate>call us</rate>
      <shippingDate>2024-01-02</shippingDate>
      <deliveryDate>soon</deliveryDate>
    </product>
    <product id="1020">
      <name>Expedited</name>
      <deliveryDate></deliveryDate>
    </product>
    <packing>
      <packingID>P_0</packingID>
      <box>
        <name>Small Box</name>
        <weight>heavy</weight>
        <length>25.0</length>
        <packedItem><quantity>many</quantity></packedItem>
      </box>
    </packing>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert_eq!(response.rates.len(), 2);
        assert_eq!(response.rates[0].total_price, Decimal::ZERO);
        assert_eq!(
            response.rates[0].shipping_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(response.rates[0].delivery_date, None);
        assert_eq!(response.rates[1].total_price, Decimal::ZERO);
        assert_eq!(response.rates[1].delivery_date, None);

        assert_eq!(
            response.boxes,
            vec![PackingBox {
                name: "Small Box".to_string(),
                weight: 0.0,
                expediter_weight: 0.0,
                length: 25.0,
                width: 0.0,
                height: 0.0,
                packed_items: vec![PackedItem {
                    quantity: 0,
                    description: String::new(),
                }],
            }]
        );
    }

    #[test]
    fn test_boxes_across_packings() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusMessage>OK</statusMessage>
    <product id="1010"><name>Regular</name><rate>9.59</rate><packingID>P_0</packingID></product>
    <packing>
      <packingID>P_0</packingID>
      <box>
        <name>Small Box</name>
        <weight>1.691</weight>
        <expediterWeight>1.691</expediterWeight>
        <length>25.0</length>
        <width>17.0</width>
        <height>16.0</height>
        <packedItem><quantity>1</quantity><description>KAO Diskettes</description></packedItem>
        <packedItem><quantity>2</quantity><description>My Ready To Ship Item</description></packedItem>
        <packedItem><quantity>3</quantity><description>Widgets</description></packedItem>
      </box>
    </packing>
    <emptySpace><length>6.0</length><width>1.0</width><height>1.0</height></emptySpace>
    <packing>
      <packingID>P_1</packingID>
      <box><name>Large Box</name><weight>4</weight></box>
    </packing>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert_eq!(response.rates[0].packing_id, "P_0");
        assert_eq!(response.boxes.len(), 2);

        let small = &response.boxes[0];
        assert_eq!(small.name, "Small Box");
        assert_eq!(small.weight, 1.691);
        assert_eq!(small.expediter_weight, 1.691);
        assert_eq!((small.length, small.width, small.height), (25.0, 17.0, 16.0));
        assert_eq!(
            small.packed_items,
            vec![
                PackedItem {
                    quantity: 1,
                    description: "KAO Diskettes".to_string()
                },
                PackedItem {
                    quantity: 2,
                    description: "My Ready To Ship Item".to_string()
                },
                PackedItem {
                    quantity: 3,
                    description: "Widgets".to_string()
                },
            ]
        );

        assert_eq!(response.boxes[1].name, "Large Box");
        assert_eq!(response.boxes[1].weight, 4.0);
        assert!(response.boxes[1].packed_items.is_empty());
    }

    #[test]
    fn test_postal_outlets() {
        let xml = wrap(
            r#"<statusCode>1</statusCode>
    <statusMessage>OK</statusMessage>
    <nearestPostalOutlet>
      <postalOutletSequenceNo>1</postalOutletSequenceNo>
      <distance>0.4</distance>
      <outletName>BYWARD PO</outletName>
      <businessName>SHOPPERS DRUG MART # 1007</businessName>
      <postalAddress>
        <addressLine>71 RIDEAU ST</addressLine>
        <postal_code>K1N5W8</postal_code>
        <municipality>OTTAWA</municipality>
        <province>ON</province>
      </postalAddress>
      <phoneNumber>6132413000</phoneNumber>
      <businessHours><dayOfWeek>1</dayOfWeek><time>10:00-17:00</time></businessHours>
      <businessHours><dayOfWeek>2</dayOfWeek><time>08:00-21:00</time></businessHours>
    </nearestPostalOutlet>
    <nearestPostalOutlet>
      <postalOutletSequenceNo>2</postalOutletSequenceNo>
      <outletName>RIDEAU CENTRE PO</outletName>
    </nearestPostalOutlet>"#,
        );

        let response = parse_rate_response(&xml).unwrap();
        assert_eq!(response.postal_outlets.len(), 2);
        assert_eq!(
            response.postal_outlets[0],
            PostalOutlet {
                sequence_no: "1".to_string(),
                distance: "0.4".to_string(),
                name: "BYWARD PO".to_string(),
                business_name: "SHOPPERS DRUG MART # 1007".to_string(),
                postal_address: Location {
                    address1: "71 RIDEAU ST".to_string(),
                    city: "OTTAWA".to_string(),
                    province: "ON".to_string(),
                    country: "Canada".to_string(),
                    postal_code: "K1N5W8".to_string(),
                    phone_number: "6132413000".to_string(),
                },
                business_hours: vec![
                    BusinessHours {
                        day_of_week: "1".to_string(),
                        time: "10:00-17:00".to_string()
                    },
                    BusinessHours {
                        day_of_week: "2".to_string(),
                        time: "08:00-21:00".to_string()
                    },
                ],
            }
        );

        let second = &response.postal_outlets[1];
        assert_eq!(second.name, "RIDEAU CENTRE PO");
        assert_eq!(second.postal_address.country, "Canada");
        assert!(second.postal_address.city.is_empty());
        assert!(second.business_hours.is_empty());
    }
}
