//! 로그 파서 벤치마크
//!
//! nginx combined, Nexus request 파서의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use logminer_core::pipeline::LogParser;
use logminer_ingest::parser::{NginxParser, NexusParser};

/// nginx 정상 HTTP 요청
const NGINX_HTTP: &str = r#"127.0.0.1 - - [29/May/2025:00:00:09 -0400] "GET /api/test HTTP/1.1" 200 1234 "-" "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36""#;

/// nginx 비 HTTP 트래픽 (센티널 분류 경로)
const NGINX_SSH_PROBE: &str =
    r#"20.51.245.17 - - [03/Jun/2025:09:04:19 -0400] "SSH-2.0-Go" 400 157 "-" "-""#;

/// Nexus 전체 필드 라인
const NEXUS_FULL: &str = r#"127.0.0.1 - admin [29/May/2025:12:34:56 +0000] "GET /repository/maven-public/com/example/artifact/1.0/artifact-1.0.jar HTTP/1.1" 200 1234 5678 89 "Apache-Maven/3.9.6 (Java 17.0.2)" [qtp123456789-42]"#;

/// Nexus 후행 필드 생략 라인
const NEXUS_SHORT: &str =
    r#"10.0.0.5 - - [29/May/2025:12:34:56 +0000] "PUT /repository/npm/pkg.tgz HTTP/1.1" 201 - 4096 12"#;

fn bench_nginx(c: &mut Criterion) {
    let parser = NginxParser::new().unwrap();

    let mut group = c.benchmark_group("nginx_parser");
    group.throughput(Throughput::Elements(1));
    group.bench_function("http_request", |b| {
        b.iter(|| parser.parse(black_box(NGINX_HTTP), 1, "nginx:access.log").unwrap())
    });
    group.bench_function("ssh_probe_sentinel", |b| {
        b.iter(|| {
            parser
                .parse(black_box(NGINX_SSH_PROBE), 1, "nginx:access.log")
                .unwrap()
        })
    });

    // 1000건 반복 처리량
    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                parser.parse(black_box(NGINX_HTTP), 1, "nginx:access.log").unwrap();
            }
        })
    });
    group.finish();
}

fn bench_nexus(c: &mut Criterion) {
    let parser = NexusParser::new().unwrap();

    let mut group = c.benchmark_group("nexus_parser");
    group.throughput(Throughput::Elements(1));
    group.bench_function("full_line", |b| {
        b.iter(|| parser.parse(black_box(NEXUS_FULL), 1, "nexus:request.log").unwrap())
    });
    group.bench_function("short_line", |b| {
        b.iter(|| parser.parse(black_box(NEXUS_SHORT), 1, "nexus:request.log").unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_nginx, bench_nexus);
criterion_main!(benches);
