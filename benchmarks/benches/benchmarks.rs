#![allow(elided_lifetimes_in_paths)]

use divan::counter::BytesCount;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use naclbox::{CryptoBox, NONCE_LEN, PrivateKey, SecretBox, poly1305, precompute, scalarmult};

const KB: usize = 1024;
const LENS: &[usize] = &[0, 64, KB, 8 * KB, 32 * KB, 64 * KB, 128 * KB, KB * KB];

fn setup() -> (CryptoBox, [u8; NONCE_LEN]) {
    let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
    let pk_a = PrivateKey::random(&mut rng);
    let pk_b = PrivateKey::random(&mut rng);
    (CryptoBox::new(&pk_a, &pk_b.public_key()), rng.r#gen())
}

#[divan::bench(args = LENS)]
fn encrypt(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| (setup(), vec![0u8; len]))
        .counter(BytesCount::new(len))
        .bench_values(|((crypto_box, nonce), plaintext)| {
            crypto_box.encrypt(&plaintext, &nonce).unwrap()
        });
}

#[divan::bench(args = LENS)]
fn decrypt(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| {
            let (crypto_box, nonce) = setup();
            let ciphertext = crypto_box.encrypt(&vec![0u8; len], &nonce).unwrap();
            (crypto_box, nonce, ciphertext)
        })
        .counter(BytesCount::new(len))
        .bench_refs(|(crypto_box, nonce, ciphertext)| {
            crypto_box.decrypt(ciphertext, nonce).unwrap()
        });
}

#[divan::bench(args = LENS)]
fn seal_in_place(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| {
            let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
            let secret_box = SecretBox::new(rng.r#gen::<[u8; 32]>()).unwrap();
            (secret_box, rng.r#gen::<[u8; NONCE_LEN]>(), vec![0u8; 16 + len])
        })
        .counter(BytesCount::new(len))
        .bench_refs(|(secret_box, nonce, buf)| secret_box.seal_in_place(buf, nonce).unwrap());
}

#[divan::bench(args = LENS)]
fn authenticate(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| {
            let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
            (rng.r#gen::<[u8; 32]>(), vec![0u8; len])
        })
        .counter(BytesCount::new(len))
        .bench_refs(|(key, message)| poly1305::authenticate(message, key));
}

#[divan::bench(args = LENS)]
fn stream_xor(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| {
            let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
            (rng.r#gen::<[u8; 32]>(), rng.r#gen::<[u8; NONCE_LEN]>(), vec![0u8; len])
        })
        .counter(BytesCount::new(len))
        .bench_refs(|(key, nonce, message)| naclbox::stream_xor(message, nonce, key).unwrap());
}

#[divan::bench]
fn scalarmult_base(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| ChaChaRng::seed_from_u64(0xDEADBEEF).r#gen::<[u8; 32]>())
        .bench_refs(|scalar| scalarmult::scalarmult_base(scalar));
}

#[divan::bench]
fn key_agreement(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| {
            let mut rng = ChaChaRng::seed_from_u64(0xDEADBEEF);
            (PrivateKey::random(&mut rng), PrivateKey::random(&mut rng).public_key())
        })
        .bench_refs(|(private_key, public_key)| precompute(private_key, public_key));
}

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}
