use crate::domain::{MessageText, Password, PhoneNumber, Username};

/// Form field added for one-time-password deliveries.
pub const OTP_FIELD: &str = "type";
const OTP_VALUE: &str = "otp";

#[derive(Debug, Clone)]
pub struct SendSmsForm<'a> {
    pub username: &'a Username,
    pub password: &'a Password,
    pub to: &'a PhoneNumber,
    pub message: &'a MessageText,
    pub otp: bool,
}

pub fn encode_send_sms_form(form: &SendSmsForm<'_>) -> Vec<(String, String)> {
    let mut params = vec![
        (Username::FIELD.to_owned(), form.username.as_str().to_owned()),
        (Password::FIELD.to_owned(), form.password.as_str().to_owned()),
        (PhoneNumber::FIELD.to_owned(), form.to.raw().to_owned()),
        (MessageText::FIELD.to_owned(), form.message.as_str().to_owned()),
    ];
    if form.otp {
        params.push((OTP_FIELD.to_owned(), OTP_VALUE.to_owned()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(otp: bool) -> Vec<(String, String)> {
        let username = Username::new("user");
        let password = Password::new("pass");
        let to = PhoneNumber::new("081234567890").unwrap();
        let message = MessageText::new("kode anda 1234").unwrap();
        encode_send_sms_form(&SendSmsForm {
            username: &username,
            password: &password,
            to: &to,
            message: &message,
            otp,
        })
    }

    #[test]
    fn encode_form_params() {
        assert_eq!(
            encode(false),
            vec![
                ("userkey".to_owned(), "user".to_owned()),
                ("passkey".to_owned(), "pass".to_owned()),
                ("nohp".to_owned(), "081234567890".to_owned()),
                ("pesan".to_owned(), "kode anda 1234".to_owned()),
            ]
        );
    }

    #[test]
    fn otp_adds_type_param() {
        let params = encode(true);
        assert_eq!(
            params.last(),
            Some(&("type".to_owned(), "otp".to_owned()))
        );
        assert_eq!(params.len(), 5);
    }
}
