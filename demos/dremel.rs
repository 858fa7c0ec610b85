use striper::schema::{optional_string, repeated_group, string, SchemaBuilder};
use striper::value::ValueBuilder;
use striper::{RecordAssembler, SchemaTree, Shredder};
use tracing_subscriber::EnvFilter;

/// # Schema
/// message doc {
///     repeated group Name {
///         repeated group Language {
///             required string Code;
///             optional string Country;
///         }
///     }
/// }
fn main() -> striper::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = SchemaBuilder::new("doc")
        .field(repeated_group(
            "Name",
            vec![repeated_group(
                "Language",
                vec![string("Code"), optional_string("Country")],
            )],
        ))
        .build();
    let tree = SchemaTree::try_new(&schema)?;

    let value = ValueBuilder::new()
        .repeated(
            "Name",
            vec![
                ValueBuilder::new() // 0
                    .repeated(
                        "Language",
                        vec![
                            ValueBuilder::new()
                                .field("Code", "en-us")
                                .field("Country", "us")
                                .build(),
                            ValueBuilder::new().field("Code", "en").build(),
                        ],
                    )
                    .build(),
                ValueBuilder::new().build(), // 1
                ValueBuilder::new() // 2
                    .repeated(
                        "Language",
                        vec![ValueBuilder::new()
                            .field("Code", "en-gb")
                            .field("Country", "gb")
                            .build()],
                    )
                    .build(),
            ],
        )
        .build();

    println!("{schema}\n");

    let columns = Shredder::new(&tree).shred_batch(&[value])?;
    println!("{columns}");

    for record in RecordAssembler::new(&tree).assemble(&columns)? {
        println!("{record}");
    }

    Ok(())
}
