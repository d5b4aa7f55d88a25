//! Schema checks that turn raw form fields into typed records.
//!
//! Rules run in declaration order and only the first failure is reported.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use dwell_types::models::PropertyStatus;

use crate::error::FormRejection;

/// Raw form submission: string keys to string values, as posted.
pub type RawForm = HashMap<String, String>;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

/// Characters that satisfy the password symbol rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_PASSWORD_LETTERS: usize = 4;
pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyForm {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: String,
    pub detail_address: Option<String>,
    pub region: String,
    pub image_url: Option<String>,
    /// `None` leaves the stored status alone on update.
    pub status: Option<PropertyStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InquiryForm {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerForm {
    pub answer: String,
}

fn field<'a>(form: &'a RawForm, key: &str) -> &'a str {
    form.get(key).map(String::as_str).unwrap_or("")
}

/// Optional free-text field; an empty submission means "not supplied".
fn optional(form: &RawForm, key: &str) -> Option<String> {
    form.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

fn reject(message: &str) -> FormRejection {
    FormRejection::new(message)
}

pub fn validate_sign_up(form: &RawForm) -> Result<SignUpForm, FormRejection> {
    let echo = || {
        ["name", "email", "phoneNumber"]
            .iter()
            .map(|key| (key.to_string(), field(form, key).to_string()))
            .collect::<BTreeMap<_, _>>()
    };
    let fail = |message: &str| reject(message).with_echo(echo());

    let name = field(form, "name");
    let email = field(form, "email");
    let password = field(form, "password");

    if chars(name) < MIN_NAME_CHARS {
        return Err(fail("Name must be at least 2 characters."));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(fail("Please enter a valid email address."));
    }
    if chars(password) < MIN_PASSWORD_CHARS {
        return Err(fail("Password must be at least 8 characters."));
    }
    if password.chars().filter(char::is_ascii_alphabetic).count() < MIN_PASSWORD_LETTERS {
        return Err(fail("Password must contain at least 4 letters."));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(fail("Password must contain at least 1 special character."));
    }

    Ok(SignUpForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone_number: optional(form, "phoneNumber"),
    })
}

pub fn validate_login(form: &RawForm) -> Result<LoginForm, FormRejection> {
    let email = field(form, "email");
    let password = field(form, "password");
    if email.is_empty() || password.is_empty() {
        return Err(reject("Email and password are required."));
    }
    Ok(LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Coerce a posted price. Blank, non-numeric, non-finite and negative inputs
/// are all rejected.
fn parse_price(raw: &str) -> Option<f64> {
    let price: f64 = raw.trim().parse().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

pub fn validate_property(form: &RawForm) -> Result<PropertyForm, FormRejection> {
    let title = field(form, "title");
    let description = field(form, "description");

    if chars(title) < MIN_TITLE_CHARS {
        return Err(reject("Title must be at least 3 characters."));
    }
    if chars(description) < MIN_DESCRIPTION_CHARS {
        return Err(reject("Description must be at least 10 characters."));
    }
    let price = parse_price(field(form, "price"))
        .ok_or_else(|| reject("Price must be a non-negative number."))?;
    let address = field(form, "address").trim();
    if address.is_empty() {
        return Err(reject("Address is required."));
    }
    let detail_address = optional(form, "detailAddress");
    let region = field(form, "region").trim();
    if region.is_empty() {
        return Err(reject("Region is required."));
    }
    let image_url = optional(form, "imageUrl");
    let status = optional(form, "status")
        .map(|s| s.parse::<PropertyStatus>())
        .transpose()
        .map_err(|_| reject("Status must be AVAILABLE or SOLD."))?;

    Ok(PropertyForm {
        title: title.to_string(),
        description: description.to_string(),
        price,
        address: address.to_string(),
        detail_address,
        region: region.to_string(),
        image_url,
        status,
    })
}

pub fn validate_inquiry(form: &RawForm) -> Result<InquiryForm, FormRejection> {
    let content = field(form, "content");
    if content.is_empty() {
        return Err(reject("Please enter your question."));
    }
    Ok(InquiryForm {
        content: content.to_string(),
    })
}

pub fn validate_answer(form: &RawForm) -> Result<AnswerForm, FormRejection> {
    let answer = field(form, "answer");
    if answer.is_empty() {
        return Err(reject("Please enter an answer."));
    }
    Ok(AnswerForm {
        answer: answer.to_string(),
    })
}
