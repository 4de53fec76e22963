use gramstay_identity_const::OTP_TTL_SECONDS;

use super::html_escape;

/// A renderable email
pub trait EmailTemplate {
    /// Subject line
    fn subject(&self) -> String;
    /// HTML body
    fn body_html(&self) -> String;
    /// Plain text body (fallback)
    fn body_text(&self) -> String;
}

/// One-time code delivery email
///
/// The only mail this service sends. The code must reach the recipient
/// out-of-band; it is never echoed in production HTTP responses.
pub struct OtpEmailTemplate {
    /// Recipient display name (user-provided, escaped in HTML)
    pub name: String,
    /// The 6-digit code
    pub code: String,
}

impl EmailTemplate for OtpEmailTemplate {
    fn subject(&self) -> String {
        "Your Gramstay verification code".to_string()
    }

    fn body_html(&self) -> String {
        let minutes = OTP_TTL_SECONDS / 60;
        format!(
            "<html><body>\
             <p>Hi {name},</p>\
             <p>Your Gramstay verification code is:</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>The code expires in {minutes} minutes and can be used once. \
             If you didn't request it, you can ignore this email.</p>\
             </body></html>",
            name = html_escape(&self.name),
            code = html_escape(&self.code),
        )
    }

    fn body_text(&self) -> String {
        let minutes = OTP_TTL_SECONDS / 60;
        format!(
            "Hi {},\n\nYour Gramstay verification code is: {}\n\n\
             The code expires in {} minutes and can be used once. \
             If you didn't request it, you can ignore this email.\n",
            self.name, self.code, minutes
        )
    }
}
