//! Building the `eparcel` rate request document.
//!
//! The Sell Online parser is order sensitive, the children of `ratesAndServicesRequest`
//! must be written exactly in the order below. In particular the destination fields have
//! to come after `lineItems`.

use std::io::{self, Write};

use quick_xml::{events::BytesText, Writer};
use rust_decimal::Decimal;

use crate::{CanadaPostError, Language, LineItem, RateRequest};

/// Prepended verbatim to every request.
pub const DOCTYPE: &str =
    r#"<!DOCTYPE eparcel SYSTEM "http://sellonline.canadapost.ca/DevelopersResources/protocolV3/eParcel.dtd">"#;

/// Build the XML body of a rate request.
pub fn build_rate_request(
    merchant_id: &str,
    language: Language,
    request: &RateRequest,
) -> Result<String, CanadaPostError> {
    let mut writer = Writer::new(Vec::with_capacity(1024));
    writer
        .create_element("eparcel")
        .write_inner_content(|w| write_eparcel(w, merchant_id, language, request))?;

    let body = String::from_utf8(writer.into_inner())?;
    Ok(format!("{}{}", DOCTYPE, body))
}

/// The sum of the price of every line item.
pub fn total_price_of(line_items: &[LineItem]) -> Decimal {
    line_items.iter().map(|item| item.price).sum()
}

fn write_eparcel<W: Write>(
    writer: &mut Writer<W>,
    merchant_id: &str,
    language: Language,
    request: &RateRequest,
) -> io::Result<()> {
    write_text_element(writer, "language", language.code())?;
    writer
        .create_element("ratesAndServicesRequest")
        .write_inner_content(|w| write_rates_and_services(w, merchant_id, request))?;
    Ok(())
}

fn write_rates_and_services<W: Write>(
    writer: &mut Writer<W>,
    merchant_id: &str,
    request: &RateRequest,
) -> io::Result<()> {
    // Merchant identification assigned by Canada Post.
    write_text_element(writer, "merchantCPCID", merchant_id)?;
    if let Some(origin) = &request.origin {
        write_text_element(writer, "fromPostalCode", &origin.postal_code)?;
    }
    if let Some(hours) = request.turn_around_time {
        write_text_element(writer, "turnAroundTime", &hours.to_string())?;
    }
    write_text_element(
        writer,
        "itemsPrice",
        &total_price_of(&request.line_items).to_string(),
    )?;

    writer
        .create_element("lineItems")
        .write_inner_content(|w| write_line_items(w, &request.line_items))?;

    // These must come after the line items.
    let destination = &request.destination;
    write_text_element(writer, "city", &destination.city)?;
    write_text_element(writer, "provOrState", &destination.province)?;
    write_text_element(writer, "country", &destination.country)?;
    write_text_element(writer, "postalCode", &destination.postal_code)?;
    Ok(())
}

fn write_line_items<W: Write>(writer: &mut Writer<W>, line_items: &[LineItem]) -> io::Result<()> {
    for item in line_items {
        writer
            .create_element("item")
            .write_inner_content(|w| write_item(w, item))?;
    }
    Ok(())
}

fn write_item<W: Write>(writer: &mut Writer<W>, item: &LineItem) -> io::Result<()> {
    write_text_element(writer, "quantity", &item.quantity.to_string())?;
    write_text_element(writer, "weight", &format_measure(item.weight))?;
    write_text_element(writer, "length", &format_measure(item.length))?;
    write_text_element(writer, "width", &format_measure(item.width))?;
    write_text_element(writer, "height", &format_measure(item.height))?;
    write_text_element(writer, "description", &item.description)?;
    if item.ready_to_ship == Some(true) {
        write_text_element(writer, "readyToShip", "true")?;
    }
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Weights and dimensions always carry a decimal part, `5` is written as `5.0`.
fn format_measure(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
