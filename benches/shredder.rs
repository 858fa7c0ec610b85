use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use striper::schema::{bool, integer, optional_map, optional_string, repeated_group, string};
use striper::{
    RecordAssembler, SchemaBuilder, SchemaTree, ShredOptions, Shredder, Value, ValueBuilder,
};

fn setup_flat_schema() -> (SchemaTree, Vec<Value>) {
    let schema = SchemaBuilder::new("flat")
        .field(string("name"))
        .field(integer("id"))
        .field(bool("active"))
        .build();
    let tree = SchemaTree::try_new(&schema).unwrap();

    let values = (0..1024)
        .map(|id| {
            ValueBuilder::default()
                .field("name", "User")
                .field("id", id)
                .field("active", id % 2 == 0)
                .build()
        })
        .collect();

    (tree, values)
}

fn benchmark_flat_schema(c: &mut Criterion) {
    let (tree, values) = setup_flat_schema();
    let shredder = Shredder::new(&tree);

    c.bench_function("flat_schema_shredder", |b| {
        b.iter(|| shredder.shred_batch(black_box(&values)).unwrap())
    });
}

fn contact(name: Option<&str>, phones: &[(&str, &str)]) -> Value {
    let builder = match name {
        Some(name) => ValueBuilder::default().field("name", name),
        None => ValueBuilder::default(),
    };
    builder
        .repeated(
            "phones",
            phones
                .iter()
                .map(|(number, phone_type)| {
                    ValueBuilder::default()
                        .field("number", *number)
                        .field("phone_type", *phone_type)
                        .build()
                })
                .collect::<Vec<_>>(),
        )
        .field(
            "labels",
            ValueBuilder::default()
                .field("team", "storage")
                .field("tier", "gold")
                .build(),
        )
        .build()
}

fn setup_nested_schema() -> (SchemaTree, Vec<Value>) {
    let schema = SchemaBuilder::new("Contact")
        .field(optional_string("name"))
        .field(repeated_group(
            "phones",
            vec![optional_string("number"), optional_string("phone_type")],
        ))
        .field(optional_map("labels", string("key"), optional_string("value")))
        .build();
    let tree = SchemaTree::try_new(&schema).unwrap();

    let values = (0..4096)
        .map(|i| match i % 4 {
            0 => contact(
                Some("Alice"),
                &[("555-1234", "Home"), ("555-5678", "Work")],
            ),
            1 => contact(Some("Bob"), &[]),
            2 => contact(Some("Diana"), &[("555-9999", "Work")]),
            _ => contact(None, &[("555-0000", "Mobile")]),
        })
        .collect();

    (tree, values)
}

fn benchmark_nested_schema(c: &mut Criterion) {
    let (tree, values) = setup_nested_schema();
    let shredder = Shredder::new(&tree);

    c.bench_function("nested_schema_shredder", |b| {
        b.iter(|| shredder.shred_batch(black_box(&values)).unwrap())
    });
}

fn benchmark_partitioned(c: &mut Criterion) {
    let (tree, values) = setup_nested_schema();
    let mut group = c.benchmark_group("partitioned_shredder");

    for partitions in [1, 2, 4, 8] {
        let shredder = Shredder::new(&tree).with_options(
            ShredOptions::new()
                .with_partitions(partitions)
                .with_min_partition_len(256),
        );
        group.bench_with_input(
            BenchmarkId::from_parameter(partitions),
            &values,
            |b, values| b.iter(|| shredder.shred_partitioned(black_box(values)).unwrap()),
        );
    }
    group.finish();
}

fn benchmark_assembly(c: &mut Criterion) {
    let (tree, values) = setup_nested_schema();
    let columns = Shredder::new(&tree).shred_batch(&values).unwrap();
    let assembler = RecordAssembler::new(&tree);

    c.bench_function("nested_schema_assembler", |b| {
        b.iter(|| assembler.assemble(black_box(&columns)).unwrap())
    });
}

criterion_group!(
    benchmark_shredder,
    benchmark_flat_schema,
    benchmark_nested_schema,
    benchmark_partitioned,
    benchmark_assembly
);
criterion_main!(benchmark_shredder);
