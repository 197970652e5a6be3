//! Rule presets for the storefront's standard forms.

use clap::ValueEnum;
use storefront_lib::validation::CommonRules;
use storefront_lib::validation::FormRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Preset {
    /// Username and password sign-in.
    Login,
    /// Mobile number and verification code sign-in.
    SmsLogin,
    /// Account registration.
    Register,
    /// Password reset by email.
    ResetPassword,
}

impl Preset {
    pub(crate) fn rules(self) -> FormRules {
        match self {
            Preset::Login => FormRules::new()
                .field("username", CommonRules::username())
                .field("password", CommonRules::password()),
            Preset::SmsLogin => FormRules::new()
                .field("phone", CommonRules::phone())
                .field("captcha", CommonRules::captcha()),
            Preset::Register => FormRules::new()
                .field("username", CommonRules::username())
                .field("email", CommonRules::email())
                .field("phone", CommonRules::phone())
                .field("password", CommonRules::password())
                .field("confirmPassword", CommonRules::confirm_password("password"))
                .field("captcha", CommonRules::captcha()),
            Preset::ResetPassword => FormRules::new()
                .field("email", CommonRules::email())
                .field("captcha", CommonRules::captcha())
                .field("password", CommonRules::password())
                .field("confirmPassword", CommonRules::confirm_password("password")),
        }
    }
}
