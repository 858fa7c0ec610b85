use striper::schema::{optional_map, optional_string, repeated_group, string};
use striper::{
    ExportedNameResolver, RecordAssembler, SchemaBuilder, SchemaTree, ShredOptions, Shredder,
    UnknownFieldPolicy, Value,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONTACTS: &str = r#"
{"name": "Alice", "phones": [{"number": "555-1234", "phone_type": "Home"}, {"number": "555-5678", "phone_type": "Work"}]}
{"name": "Bob", "labels": {"team": "storage"}}
{"name": "Charlie", "phones": []}
{"name": "Diana", "phones": [{"number": "555-9999", "phone_type": "Work"}], "labels": {}}
{"phones": [{"phone_type": "Mobile"}], "nickname": "Eve"}
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = SchemaBuilder::new("Contact")
        .field(optional_string("name"))
        .field(repeated_group(
            "phones",
            vec![optional_string("number"), optional_string("phone_type")],
        ))
        .field(optional_map("labels", string("key"), optional_string("value")))
        .build();
    let tree = SchemaTree::try_new(&schema)?;

    let values = CONTACTS
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str::<serde_json::Value>(line).map(Value::from))
        .collect::<Result<Vec<_>, _>>()?;

    // Unknown properties such as `nickname` are dropped with a trace event
    let shredder = Shredder::new(&tree)
        .with_options(ShredOptions::new().with_unknown_fields(UnknownFieldPolicy::Ignore));
    let columns = shredder.shred_batch(&values)?;
    println!("{columns}");

    for record in RecordAssembler::new(&tree).assemble(&columns)? {
        println!("{record}");
    }

    // Exported names are rewritten before they are looked up
    let exported = SchemaBuilder::new("Exported")
        .field(optional_string("Name"))
        .field(optional_string("Phone95type"))
        .build();
    let exported_tree = SchemaTree::try_new(&exported)?;
    let record = serde_json::from_str::<serde_json::Value>(
        r#"{"name": "Frank", "phone_type": "Home"}"#,
    )?;
    let columns = Shredder::new(&exported_tree)
        .with_resolver(Arc::new(ExportedNameResolver))
        .shred_batch(&[Value::from(record)])?;
    println!("{columns}");

    Ok(())
}
