use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scriptplay::clock::{Clock, LineSource};
use scriptplay::script::{Engine, FlagStore, Instruction, Opcode, Program, TagIndex};

struct NoWait;

impl Clock for NoWait {
    async fn sleep(&mut self, _ms: f64) {}
}

struct NoInput;

impl LineSource for NoInput {
    async fn read_line(&mut self) -> Option<String> {
        None
    }
}

/// `blocks` repetitions of a tagged block that bumps a counter, prints a
/// line, and jumps over a guarded section.
fn make_program(blocks: usize) -> Program {
    let mut v = Vec::with_capacity(blocks * 8);
    for i in 0..blocks {
        v.push(Instruction::new(Opcode::Tag).with_param1(format!("b{i}")));
        v.push(Instruction::new(Opcode::FlagAdd).with_param1("n").with_param2("1"));
        v.push(Instruction::new(Opcode::AutoText).with_speaker("SH_Aoi").with_text("Line one.<br>Line two."));
        v.push(Instruction::new(Opcode::If).with_param1("n < 0"));
        v.push(Instruction::new(Opcode::AutoText).with_text("never"));
        v.push(Instruction::new(Opcode::EndIf));
        v.push(Instruction::new(Opcode::Jump).with_param1(format!("s{i}")));
        v.push(Instruction::new(Opcode::Tag).with_param1(format!("s{i}")));
    }
    Program::new(v)
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let mut g = c.benchmark_group("dispatch");
    for blocks in [100, 1_000, 10_000] {
        let program = make_program(blocks);

        g.bench_with_input(BenchmarkId::new("run", blocks), &program, |b, p| {
            b.iter(|| {
                rt.block_on(async {
                    let mut e = Engine::new(p.clone(), FlagStore::new(["n"]), NoWait, NoInput, Vec::new())
                        .expect("valid program");
                    e.run().await.expect("run");
                    black_box(e.into_output().len())
                })
            })
        });

        g.bench_with_input(BenchmarkId::new("tag_index", blocks), &program, |b, p| {
            b.iter(|| TagIndex::build(black_box(p)).map(|t| t.len()))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
