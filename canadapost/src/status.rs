//! Sell Online status codes.
//!
//! Every eParcel response carries a `statusCode`. Only `1` and `2` mean rates were
//! calculated; everything else is a failure. The descriptions below come from the
//! Sell Online developer documentation and are only used to explain a code to a human.

/// Status code returned when all calculations were done.
pub const STATUS_OK: &str = "1";

/// Status code returned when the vendor fell back to the merchant's default rates because
/// of a problem while processing the request.
pub const STATUS_DEFAULT_RATES: &str = "2";

/// Vendor status codes and their descriptions.
pub const RESPONSE_CODES: &[(&str, &str)] = &[
    ("1", "All calculation was done"),
    (
        "2",
        "Default shipping rates are returned due to a problem during the processing of the request.",
    ),
    ("-2", "Missing argument when calling module"),
    ("-5", "No Item to ship"),
    ("-6", "Illegal Item weight"),
    ("-7", "Illegal item dimension"),
    ("-12", "Can't open IM config file"),
    ("-13", "Can't create log files"),
    ("-15", "Invalid config file format"),
    ("-102", "Invalid socket connection"),
    ("-106", "Can't connect to server"),
    ("-1000", "Unknow request type sent by client"),
    ("-1002", "MAS Timed out"),
    ("-1004", "Socket communication break"),
    ("-1005", "Did not receive required data on socket."),
    ("-2000", "Unable to estabish socket connection with RSSS"),
    ("-2001", "Merchant Id not found on server"),
    ("-2002", "One or more parameter was not sent by the IM to the MAS"),
    ("-2003", "Did not receive required data on socket."),
    ("-2004", "The request contains to many items to process it."),
    (
        "-2005",
        "The request received on socket is larger than the maximum allowed.",
    ),
    ("-3000", "Origin Postal Code is illegal"),
    ("-3001", "Destination Postal Code/State Name/ Country  is illegal"),
    ("-3002", "Parcel too large to be shipped with CPC"),
    ("-3003", "Parcel too small to be shipped with CPC"),
    ("-3004", "Parcel too heavy to be shipped with CPC"),
    ("-3005", "Internal error code returned by the rating DLL"),
    ("-3006", "The pick up time format is invalid or not defined."),
    ("-4000", "Volumetric internal error"),
    ("-4001", "Volumetric time out calculation error."),
    ("-4002", "No bins provided to the volumetric engine."),
    ("-4003", "No items provided to the volumetric engine."),
    ("-4004", "Item is too large to be packed"),
    ("-4005", "Number of item more than maximum allowed"),
    ("-5000", "XML Parsing error"),
    ("-5001", "XML Tag not found"),
    ("-5002", "Node Value Number format error"),
    ("-5003", "Node value is empty"),
    ("-5004", "Unable to create/parse XML Document"),
    ("-6000", "Unable to open the database"),
    ("-6001", "Unable to read from the database"),
    ("-6002", "Unable to write to the database"),
    ("-50000", "Internal problem - Please contact Sell Online Help Desk"),
];

/// Look up the documented description of a status code.
pub fn describe(code: &str) -> Option<&'static str> {
    let code = code.trim();
    RESPONSE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}

/// Returns true if the status code means rates were returned.
pub fn is_success(code: &str) -> bool {
    matches!(code.trim(), STATUS_OK | STATUS_DEFAULT_RATES)
}
