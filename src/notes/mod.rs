mod handlers;
mod model;
mod routes;

pub use model::{Created, CreateNote, CreationEvent, HistoryEntry, IndexStats, Note, Resolved};
pub use routes::router;

use minijinja::Environment;

pub fn add_templates(env: &mut Environment) {
    [
        env.add_template("base.html", include_str!("views/base.html")),
        env.add_template("index.html", include_str!("views/index.html")),
        env.add_template("share.html", include_str!("views/share.html")),
        env.add_template("view.html", include_str!("views/view.html")),
        env.add_template("expired.html", include_str!("views/expired.html")),
    ]
    .map(|r| r.unwrap());
}
