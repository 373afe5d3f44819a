/// Cookie backed flash data: set on the redirect, gone after the next render
use axum_extra::extract::cookie::{Cookie, CookieJar};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

const SUCCESS_COOKIE: &str = "flash_success";
const IMAGE_URL_COOKIE: &str = "flash_image_url";

// Characters that are not allowed in a cookie value
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

pub struct Flash {
    pub success: String,
    pub image_url: String,
}

pub fn set(jar: CookieJar, success: &str, image_url: &str) -> CookieJar {
    jar.add(flash_cookie(SUCCESS_COOKIE, success))
        .add(flash_cookie(IMAGE_URL_COOKIE, image_url))
}

/// Read pending flash values and drop their cookies in one move
pub fn take(jar: CookieJar) -> (Option<Flash>, CookieJar) {
    let success = read(&jar, SUCCESS_COOKIE);
    let image_url = read(&jar, IMAGE_URL_COOKIE);

    let jar = jar
        .remove(removal_cookie(SUCCESS_COOKIE))
        .remove(removal_cookie(IMAGE_URL_COOKIE));

    match (success, image_url) {
        (Some(success), Some(image_url)) => (Some(Flash { success, image_url }), jar),
        _ => (None, jar),
    }
}

fn read(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| percent_decode_str(cookie.value()).decode_utf8_lossy().into_owned())
}

fn flash_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    let encoded = utf8_percent_encode(value, COOKIE_VALUE).to_string();
    Cookie::build((name, encoded))
        .path("/")
        .http_only(true)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}
