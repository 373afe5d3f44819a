use crate::flash;
use axum_extra::extract::cookie::CookieJar;
use maud::{html, Markup, DOCTYPE};

pub async fn welcome() -> Markup {
    html! {
        (DOCTYPE)
        html {
            head { title { "imgup-serve" } }
            body {
                h1 { "Welcome to imgup-serve" }
                p {
                    "Host an image with the " a href="/upload" { "upload form" }
                }
            }
        }
    }
}

/// Upload form page, rendering any flash data left by the previous upload
pub async fn upload_form(jar: CookieJar) -> (CookieJar, Markup) {
    let (flash, jar) = flash::take(jar);

    let markup = html! {
        (DOCTYPE)
        html {
            head { title { "Upload an image" } }
            body {
                h1 { "Upload an image" }
                @if let Some(flash) = &flash {
                    p class="success" { (flash.success) }
                    p {
                        "Hosted at " a href=(flash.image_url) { (flash.image_url) }
                    }
                    img src=(flash.image_url) alt="Uploaded image" width="300";
                }
                form action="/upload" method="post" enctype="multipart/form-data" {
                    input type="file" name="image" accept="image/jpeg,image/png,image/gif";
                    button type="submit" { "Upload" }
                }
            }
        }
    };

    (jar, markup)
}
