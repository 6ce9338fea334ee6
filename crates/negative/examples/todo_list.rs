//! Build and edit a small todo list with chained collection calls

use negative::dom::{Document, DocumentConfig, ReadyState};
use negative::{dom_ready, select, Collection, SelectorInput};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let doc = Document::with_config(DocumentConfig {
        url: "https://example.test/todo".to_string(),
        ready_state: ReadyState::Loading,
        ..DocumentConfig::default()
    });

    let body = doc.create_element("body")?;
    doc.append_child(doc.root(), body)?;
    Collection::new(&doc, SelectorInput::Node(body)).append_element("<ul>", [("id", "todo")]);

    let host = doc.clone();
    dom_ready(&doc, move || {
        let list = Collection::new(&host, "#todo");
        for task in ["write docs", "ship it", "celebrate"] {
            list.append_element("li", [("class", "task")]).write_text(task);
        }
        list.prepend_element("li", [("class", "header")])
            .write_text("Today")
            .set_css("fontWeight", "bold");

        let clicked = host.clone();
        list.find(".task").on("click", move |event| {
            Collection::new(&clicked, SelectorInput::Node(event.target)).add_class_name("done");
        });
    });

    doc.finish_parsing();

    let tasks = select(&doc, "li.task")?.into_vec().remove(0);
    if let Some(second) = tasks.element_exist().get(1) {
        doc.dispatch_event(second.nodes()[0], "click");
    }

    println!("{}", doc.outer_html(doc.root())?);
    println!("done: {:?}", Collection::new(&doc, ".done").get_attribute("class"));
    Ok(())
}
