use kwhash::{
    codegen::CodeGenerator,
    corpus::{read_keys, read_seeds, Delimiter},
    emit::Order,
    family::StringFn,
    search::{Search, SearchConfig, SearchSpace, Seeds},
    HashFn, KeySet, Reduction,
};
use std::fmt::Write;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn open(name: &str) -> BufReader<File> {
    let path = Path::new(&std::env::var("CARGO_MANIFEST_DIR").unwrap())
        .join("data")
        .join(name);
    println!("cargo::rerun-if-changed={}", path.display());
    BufReader::new(File::open(path).expect("Failed to open corpus"))
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    let python = read_keys(open("python.txt"), Delimiter::Line).expect("Invalid keyword corpus");
    let search = Search::new(
        &python,
        SearchSpace::for_keys(python.len()),
        SearchConfig::new(),
    )
    .expect("Invalid search configuration");
    let solution = search.first(&mut ()).into_result().expect("Search failed");
    let table = solution.table(Order::Slots);
    table.verify().expect("Table does not match its candidate");
    std::fs::write(out_dir.join("python.txt"), table.to_string()).unwrap();
    let code = CodeGenerator::new().generate(&table.keywords().unwrap());
    std::fs::write(out_dir.join("python.rs"), code.to_string()).unwrap();

    let primes = read_seeds(open("primes.txt"), Delimiter::Whitespace).expect("Invalid seed corpus");

    // Every prime seed under djb2 with `(h >> 8) & 0xff`, listed by slot.
    let space = SearchSpace::new(
        vec![HashFn::String(StringFn::Djb2)],
        Seeds::List(primes.clone()),
        vec![Reduction::bits(8).with_shift(8)],
    );
    let survey = Search::new(&python, space, SearchConfig::new())
        .expect("Invalid search configuration")
        .all(&mut ());
    let mut scan = String::new();
    writeln!(scan, "// {} tried, {} found", survey.tried, survey.solutions.len()).unwrap();
    if let Some(closest) = &survey.closest {
        writeln!(scan, "// closest: {}, {} colliding keys", closest.candidate, closest.collisions).unwrap();
    }
    if let Some(last) = &survey.last {
        writeln!(scan, "// last: {last}").unwrap();
    }
    for solution in &survey.solutions {
        scan.push_str(&solution.table(Order::Slots).to_string());
    }
    std::fs::write(out_dir.join("scan.txt"), scan).unwrap();

    // The last 13 keywords are operators.
    let operators = KeySet::new(python.iter().skip(23)).unwrap();
    let space = SearchSpace::new(
        vec![HashFn::String(StringFn::Djb2)],
        Seeds::List(primes),
        (5..=8).map(Reduction::bits).collect(),
    );
    let search = Search::new(&operators, space, SearchConfig::new().with_progress_interval(64))
        .expect("Invalid search configuration");
    let mut reports = 0;
    let solution = search
        .first(&mut |_tried: u64| reports += 1)
        .into_result()
        .expect("Search failed");
    println!(
        "cargo::rustc-env=OPERATORS_SEARCH={} {} {reports}",
        solution.position(),
        solution.candidate(),
    );
    let table = solution.table(Order::Keys);
    let code = CodeGenerator::new().generate(&table.keywords().unwrap());
    std::fs::write(out_dir.join("operators.rs"), code.to_string()).unwrap();
}
