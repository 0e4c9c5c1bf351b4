use strum_macros::{Display, EnumString};
/// Enum for all endpoints used from the hotmail007 API
#[derive(EnumString, Display, Copy, Clone, Debug, PartialEq)]
pub enum Endpoint {
    #[strum(serialize = "/api/mail/getStock")]
    Stock,
    #[strum(serialize = "/api/mail/getMail")]
    BuyMail,
}
